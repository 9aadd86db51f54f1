use crate::{digest::Digester, id::Identifier, shutdown::TaskGuard, store::ResultStore};
use core::time::Duration;
use std::sync::Arc;
use tokio::{
    task::JoinHandle,
    time::{Instant, sleep},
};

/// A secret waiting for its digest.
///
/// Created at submission time and owned by exactly one background task; it is
/// consumed when the task records its result.
#[derive(Debug)]
pub struct PendingSubmission {
    pub id: Identifier,
    pub secret: String,
    /// Captured before the processing delay, so every recorded latency
    /// includes it.
    pub submitted_at: Instant,
}

/// Spawns one background task per submission.
///
/// Each task sleeps for the configured delay, digests the secret, writes the
/// result into the [`ResultStore`] together with the elapsed time since
/// submission, and finally drops its [`TaskGuard`]. Tasks are never
/// cancelled once spawned.
pub struct TaskRunner<D> {
    store: Arc<ResultStore>,
    digester: Arc<D>,
    delay: Duration,
}

impl<D> TaskRunner<D>
where
    D: Digester,
{
    pub fn new(store: Arc<ResultStore>, digester: Arc<D>, delay: Duration) -> Self {
        Self {
            store,
            digester,
            delay,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Spawns the delayed digest task for `submission`.
    ///
    /// `guard` must have been obtained before this call; it is released only
    /// after the result is visible in the store.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn spawn(&self, submission: PendingSubmission, guard: TaskGuard) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let digester = Arc::clone(&self.digester);
        let delay = self.delay;

        #[cfg(feature = "tracing")]
        tracing::info!(
            id = %submission.id,
            "Received secret, waiting {:?} to generate digest",
            delay
        );

        let fut = async move {
            sleep(delay).await;
            run_submission(&store, digester.as_ref(), submission);
            drop(guard);
        };

        #[cfg(feature = "tracing")]
        let fut = {
            use tracing::Instrument;
            fut.instrument(tracing::info_span!("digest_task"))
        };

        tokio::spawn(fut)
    }
}

fn run_submission<D>(store: &ResultStore, digester: &D, submission: PendingSubmission)
where
    D: Digester + ?Sized,
{
    let PendingSubmission {
        id,
        secret,
        submitted_at,
    } = submission;

    let digest = digester.digest(&secret);
    let latency = submitted_at.elapsed();
    store.put(id, digest, latency);

    #[cfg(feature = "tracing")]
    tracing::debug!(%id, latency_ms = latency.as_millis() as u64, "Digest recorded");
}
