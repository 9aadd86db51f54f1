//! The digest service facade.
//!
//! [`HashService`] ties the allocator, the result store, the task runner and
//! the shutdown coordinator together behind the five operations a boundary
//! layer needs: submit, query, stats, initiate shutdown and await stopped.
//!
//! ## Submission path
//!
//! 1. Reject empty secrets.
//! 2. Register one outstanding task (fails once shutdown was initiated).
//! 3. Allocate the identifier and capture the submission timestamp.
//! 4. Spawn the delayed digest task and return the identifier immediately.
//!
//! Registration happens before anything is spawned, so a drain that starts
//! concurrently either sees the task as outstanding or rejects the submission;
//! there is no window in which a task runs unaccounted for.

use crate::{
    config::ServiceConfig,
    digest::{Digester, Sha512Digester},
    error::{Error, Result},
    id::{AtomicIdAllocator, IdAllocator, Identifier},
    runner::{PendingSubmission, TaskRunner},
    shutdown::{ShutdownCoordinator, ShutdownState},
    store::{ResultStore, StatsSnapshot},
};
use std::sync::Arc;
use tokio::time::Instant;

/// Cheaply cloneable handle to the digest service.
///
/// All clones share the same allocator, store and coordinator.
pub struct HashService<A = AtomicIdAllocator, D = Sha512Digester> {
    inner: Arc<Inner<A, D>>,
}

struct Inner<A, D> {
    allocator: A,
    store: Arc<ResultStore>,
    runner: TaskRunner<D>,
    coordinator: Arc<ShutdownCoordinator>,
}

impl<A, D> Clone for HashService<A, D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl HashService {
    /// Creates a service with the lock-free allocator and SHA-512 digests.
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_parts(config, AtomicIdAllocator::new(), Sha512Digester)
    }
}

impl Default for HashService {
    fn default() -> Self {
        Self::new(ServiceConfig::default())
    }
}

impl<A, D> HashService<A, D>
where
    A: IdAllocator,
    D: Digester,
{
    /// Creates a service from an explicit allocator and digester.
    pub fn with_parts(config: ServiceConfig, allocator: A, digester: D) -> Self {
        #[cfg(feature = "tracing")]
        tracing::info!("Initializing digest service with {:?} delay", config.delay);

        let store = Arc::new(ResultStore::new());
        let runner = TaskRunner::new(Arc::clone(&store), Arc::new(digester), config.delay);

        Self {
            inner: Arc::new(Inner {
                allocator,
                store,
                runner,
                coordinator: Arc::new(ShutdownCoordinator::new()),
            }),
        }
    }

    /// Accepts `secret` for delayed digesting and returns its identifier.
    ///
    /// Returns as soon as the background task is scheduled; the digest becomes
    /// visible through [`Self::query`] after the configured delay.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if `secret` is empty.
    /// - [`Error::ServiceShutdown`] once shutdown has been initiated.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn submit(&self, secret: impl Into<String>) -> Result<Identifier> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(Error::InvalidInput {
                reason: "secret must not be empty".to_string(),
            });
        }

        let guard = self.inner.coordinator.register()?;
        let id = self.inner.allocator.next_id();
        let submission = PendingSubmission {
            id,
            secret,
            submitted_at: Instant::now(),
        };
        // The task is detached: it always runs to completion and reports
        // through the store and the coordinator, never through its handle.
        drop(self.inner.runner.spawn(submission, guard));

        Ok(id)
    }

    /// Returns the digest recorded for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the identifier is unknown or its task
    /// has not finished yet. The two cases are indistinguishable.
    pub fn query(&self, id: Identifier) -> Result<String> {
        self.inner.store.get(id)
    }

    /// Count and mean latency of all completed digests.
    pub fn stats(&self) -> StatsSnapshot {
        self.inner.store.stats()
    }

    /// Stops accepting submissions and begins draining outstanding tasks.
    ///
    /// Returns immediately. Calling it again is a no-op that returns `false`.
    pub fn initiate_shutdown(&self) -> bool {
        self.inner.coordinator.initiate_shutdown()
    }

    /// Waits until every task submitted before shutdown has recorded its
    /// digest. Never resolves if shutdown is never initiated.
    pub async fn await_stopped(&self) {
        self.inner.coordinator.await_stopped().await;
    }

    /// Waits until shutdown has been initiated, by any caller.
    pub async fn await_draining(&self) {
        self.inner.coordinator.await_draining().await;
    }

    pub fn state(&self) -> ShutdownState {
        self.inner.coordinator.state()
    }

    pub fn is_accepting(&self) -> bool {
        self.inner.coordinator.is_accepting()
    }

    /// Number of submissions whose digest has not been recorded yet.
    pub fn outstanding(&self) -> usize {
        self.inner.coordinator.outstanding()
    }

    pub fn config(&self) -> ServiceConfig {
        ServiceConfig::with_delay(self.inner.runner.delay())
    }
}
