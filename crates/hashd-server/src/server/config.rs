use anyhow::Context;
use clap::Parser;
use core::time::Duration;
use hashd::{DEFAULT_DIGEST_DELAY, ServiceConfig};
use std::net::SocketAddr;

/// Runtime configuration for the `hashd-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (a `.env`
/// file is honoured), with defaults matching the reference deployment.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "hashd-server",
    version,
    about = "An HTTP service for delayed SHA-512 secret digests"
)]
pub struct CliArgs {
    /// Address to listen on.
    ///
    /// Example: "127.0.0.1:8080" or "0.0.0.0:8080"
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("127.0.0.1:8080"))]
    pub server_addr: String,

    /// Delay in milliseconds between accepting a secret and computing its
    /// digest.
    ///
    /// Every latency reported by `/stats` includes this delay.
    ///
    /// Environment variable: `DIGEST_DELAY_MS`
    #[arg(long, env = "DIGEST_DELAY_MS", default_value_t = DEFAULT_DIGEST_DELAY.as_millis() as u64)]
    pub delay_ms: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: SocketAddr,
    pub service: ServiceConfig,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let server_addr = args
            .server_addr
            .parse()
            .with_context(|| format!("SERVER_ADDR ({}) is not a socket address", args.server_addr))?;

        Ok(Self {
            server_addr,
            service: ServiceConfig::with_delay(Duration::from_millis(args.delay_ms)),
        })
    }
}
