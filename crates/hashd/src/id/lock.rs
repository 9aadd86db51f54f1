use crate::id::{IdAllocator, Identifier};
use parking_lot::Mutex;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// A mutex-guarded identifier allocator.
///
/// Functionally identical to [`AtomicIdAllocator`], but callers take turns on
/// a [`parking_lot::Mutex`]. Fair under heavy contention at the cost of raw
/// throughput.
///
/// ## See Also
/// - [`AtomicIdAllocator`]
///
/// [`AtomicIdAllocator`]: crate::AtomicIdAllocator
pub struct LockIdAllocator {
    last: Mutex<u64>,
}

impl LockIdAllocator {
    /// Creates an allocator whose first identifier will be `1`.
    pub fn new() -> Self {
        Self::from_last(0)
    }

    /// Creates an allocator that resumes after `last`.
    pub fn from_last(last: u64) -> Self {
        Self {
            last: Mutex::new(last),
        }
    }
}

impl Default for LockIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator for LockIdAllocator {
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    fn next_id(&self) -> Identifier {
        let mut last = self.last.lock();
        let Some(id) = last.checked_add(1).and_then(Identifier::new) else {
            panic!("identifier space exhausted");
        };
        *last = id.get();
        id
    }

    fn last_issued(&self) -> Option<Identifier> {
        Identifier::new(*self.last.lock())
    }
}
