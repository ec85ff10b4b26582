//! Handles to resident entries.
//!
//! A [`Handle`] is a small `Copy` token naming one entry of one cache. It
//! carries no borrow of the cache, so callers can hold any number of handles
//! while continuing to call into the cache. Value access goes back through the
//! cache that issued the handle:
//!
//! ```
//! use pincache::PinnedLfuCache;
//!
//! let mut cache: PinnedLfuCache<u32, u64> = PinnedLfuCache::new(4).unwrap();
//! let handle = cache.insert(1, true).unwrap();
//! *cache.value_mut(handle).unwrap() = 111;
//! assert_eq!(cache.value(handle), Some(&111));
//! cache.release(handle);
//! ```
//!
//! Two handles to the same resident entry compare equal. A handle outlives
//! its entry only as a stale token: once the entry is evicted or erased, every
//! accessor taking that handle returns `None` or `false`, even if the freed
//! slot is later reused for another key. Each slot counts its occupants with
//! a 32-bit generation; a slot that exhausts it is retired rather than
//! wrapped, so the guarantee holds for the life of the cache.
//!
//! Handles are only meaningful for the cache that issued them.

use crate::slab::SlotId;

/// Capability referencing exactly one cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    slot: SlotId,
}

impl Handle {
    #[inline]
    pub(crate) fn new(slot: SlotId) -> Self {
        Handle { slot }
    }

    /// Arena slot of the entry, for diagnostics.
    #[inline]
    pub fn slot(self) -> SlotId {
        self.slot
    }
}
