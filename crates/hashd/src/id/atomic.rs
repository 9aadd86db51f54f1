use crate::id::{IdAllocator, Identifier};
use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

/// A lock-free identifier allocator suitable for multi-threaded environments.
///
/// The counter lives in a single [`AtomicU64`] and every call to
/// [`IdAllocator::next_id`] is one `fetch_add`, so callers never block each
/// other.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Never blocks
///
/// ## Recommended When
/// - Many request handlers allocate concurrently
/// - Throughput matters more than fairness
///
/// ## See Also
/// - [`LockIdAllocator`](crate::LockIdAllocator)
pub struct AtomicIdAllocator {
    #[cfg(feature = "cache-padded")]
    last: crossbeam_utils::CachePadded<AtomicU64>,
    #[cfg(not(feature = "cache-padded"))]
    last: AtomicU64,
}

impl AtomicIdAllocator {
    /// Creates an allocator whose first identifier will be `1`.
    ///
    /// # Example
    /// ```
    /// use hashd::{AtomicIdAllocator, IdAllocator};
    ///
    /// let allocator = AtomicIdAllocator::new();
    /// assert_eq!(allocator.next_id().get(), 1);
    /// assert_eq!(allocator.next_id().get(), 2);
    /// ```
    pub const fn new() -> Self {
        Self::from_last(0)
    }

    /// Creates an allocator that resumes after `last`.
    ///
    /// The next call to [`IdAllocator::next_id`] returns `last + 1`.
    pub const fn from_last(last: u64) -> Self {
        Self {
            #[cfg(feature = "cache-padded")]
            last: crossbeam_utils::CachePadded::new(AtomicU64::new(last)),
            #[cfg(not(feature = "cache-padded"))]
            last: AtomicU64::new(last),
        }
    }
}

impl Default for AtomicIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator for AtomicIdAllocator {
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    fn next_id(&self) -> Identifier {
        // Relaxed is enough: only uniqueness is required. The counter saturates
        // at `u64::MAX` instead of wrapping, so exhaustion never re-issues ids.
        let next = self
            .last
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |last| {
                last.checked_add(1)
            })
            .ok()
            .and_then(|prev| prev.checked_add(1))
            .and_then(Identifier::new);
        let Some(id) = next else {
            panic!("identifier space exhausted");
        };
        id
    }

    fn last_issued(&self) -> Option<Identifier> {
        Identifier::new(self.last.load(Ordering::Relaxed))
    }
}
