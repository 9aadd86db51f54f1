use core::time::Duration;

/// Fixed processing delay applied to every submission before its digest is
/// computed.
pub const DEFAULT_DIGEST_DELAY: Duration = Duration::from_secs(5);

/// Service-level settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Artificial delay between submission and digest computation. Every
    /// recorded latency includes it.
    pub delay: Duration,
}

impl ServiceConfig {
    pub const fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::with_delay(DEFAULT_DIGEST_DELAY)
    }
}
