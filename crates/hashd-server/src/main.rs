#![doc = include_str!("../README.md")]

mod server;

use clap::Parser;
use hashd::HashService;
use server::config::{CliArgs, ServerConfig};
use server::routes::router;
use server::telemetry::init_telemetry;
use tokio::net::TcpListener;
use tokio::signal;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    let providers = init_telemetry()?;

    let service = HashService::new(config.service);
    let listener = TcpListener::bind(config.server_addr).await?;
    log_startup_info(&config);

    axum::serve(listener, router(service.clone()))
        .with_graceful_shutdown(shutdown_signal(service.clone()))
        .await?;

    tracing::info!(
        outstanding = service.outstanding(),
        "Listener closed, waiting for in-flight digests"
    );
    service.await_stopped().await;

    let stats = service.stats();
    tracing::info!(
        total = stats.total,
        average_ms = stats.average_latency_ms,
        "Service shut down successfully"
    );

    providers.shutdown();
    Ok(())
}

fn log_startup_info(config: &ServerConfig) {
    if cfg!(debug_assertions) {
        tracing::info!(
            "Starting hash service on {} with full config: {:#?}",
            config.server_addr,
            config
        );
    } else {
        tracing::info!(
            "Starting hash service on {} with a {:?} digest delay",
            config.server_addr,
            config.service.delay
        );
    }
}

/// Resolves once the service starts draining, either because `/shutdown` was
/// called or because the process received SIGINT / SIGTERM.
async fn shutdown_signal(service: HashService) {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                core::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = core::future::pending::<()>();

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            core::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
        () = service.await_draining() => {
            tracing::info!("Shutdown requested over HTTP");
        },
    }

    // No-op when `/shutdown` already started the drain.
    service.initiate_shutdown();
    tracing::info!("No longer accepting connections, terminating gracefully...");
}
