use crate::{
    error::{Error, Result},
    id::Identifier,
    store::StatsSnapshot,
};
use core::time::Duration;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Concurrency-safe map from identifier to digest, plus the append-only log of
/// completion latencies.
///
/// All state sits behind a single [`RwLock`]: any number of [`get`] and
/// [`stats`] calls proceed in parallel, while [`put`] is exclusive against
/// both. Once `put` returns, every later read observes the write.
///
/// [`get`]: ResultStore::get
/// [`stats`]: ResultStore::stats
/// [`put`]: ResultStore::put
#[derive(Default)]
pub struct ResultStore {
    inner: RwLock<Records>,
}

#[derive(Default)]
struct Records {
    digests: HashMap<Identifier, String>,
    latencies: Vec<Duration>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the digest for `id` and appends `latency` to the log.
    ///
    /// Each identifier is expected to be written once. A second write for the
    /// same identifier is not rejected: the digest is replaced and a second
    /// latency is logged.
    pub fn put(&self, id: Identifier, digest: String, latency: Duration) {
        let mut records = self.inner.write();
        records.digests.insert(id, digest);
        records.latencies.push(latency);
    }

    /// Returns the digest recorded for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no digest has been recorded, whether the
    /// identifier was never issued or its task is still pending.
    pub fn get(&self, id: Identifier) -> Result<String> {
        self.inner
            .read()
            .digests
            .get(&id)
            .cloned()
            .ok_or(Error::NotFound { id })
    }

    /// Derives a fresh [`StatsSnapshot`] from the latency log.
    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot::from_latencies(&self.inner.read().latencies)
    }

    /// Number of identifiers with a recorded digest.
    pub fn len(&self) -> usize {
        self.inner.read().digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
