use core::time::Duration;

/// Count and mean latency of all completed digests.
///
/// A snapshot is derived from the latency log on every call to
/// [`ResultStore::stats`](crate::ResultStore::stats) and never cached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatsSnapshot {
    /// Number of completed digests.
    pub total: u64,
    /// Arithmetic mean of the recorded latencies, in whole milliseconds.
    #[cfg_attr(feature = "serde", serde(rename = "average"))]
    pub average_latency_ms: u64,
}

impl StatsSnapshot {
    /// Computes a snapshot over `latencies`.
    ///
    /// Each latency is truncated to whole milliseconds before summing, and the
    /// mean uses truncating integer division. An empty log yields `{0, 0}`.
    ///
    /// # Example
    /// ```
    /// use core::time::Duration;
    /// use hashd::StatsSnapshot;
    ///
    /// let stats = StatsSnapshot::from_latencies(&[
    ///     Duration::from_millis(2000),
    ///     Duration::from_millis(4001),
    /// ]);
    /// assert_eq!(stats.total, 2);
    /// assert_eq!(stats.average_latency_ms, 3000);
    /// ```
    pub fn from_latencies(latencies: &[Duration]) -> Self {
        let total = latencies.len() as u64;
        if total == 0 {
            return Self::default();
        }

        let sum: u128 = latencies.iter().map(Duration::as_millis).sum();
        Self {
            total,
            average_latency_ms: (sum / u128::from(total)) as u64,
        }
    }
}
