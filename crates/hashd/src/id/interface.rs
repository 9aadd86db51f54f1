use crate::id::Identifier;

/// A minimal interface for issuing submission identifiers.
///
/// Implementations must be safe to share across threads and must return
/// `1, 2, 3, …` with no gaps and no duplicates, no matter how many callers race
/// on [`IdAllocator::next_id`]. Which caller observes which value is
/// unspecified.
pub trait IdAllocator: Send + Sync {
    /// Issues the next identifier.
    ///
    /// # Panics
    ///
    /// Panics if the `u64` identifier space is exhausted.
    fn next_id(&self) -> Identifier;

    /// Returns the most recently issued identifier without allocating one, or
    /// `None` if nothing has been issued yet.
    fn last_issued(&self) -> Option<Identifier>;
}
