//! Concurrent Cache Implementations
//!
//! Thread-safe access to the pinned LFU engine through sharding:
//! - The key space is partitioned across shards by hashing the key
//! - Each shard is a [`PinnedLfuCache`](crate::PinnedLfuCache) behind its own
//!   `parking_lot::Mutex`
//! - An operation locks only the shard its key (or handle) belongs to
//!
//! ## Why Mutex Instead of RwLock?
//!
//! Every access by key mutates the engine: the frequency goes up, the entry
//! moves between ledger buckets, and pin counts change. A read lock would
//! never be enough, so shards use a plain `Mutex`.
//!
//! # Default Segment Count
//!
//! `min(available_parallelism * 4, 64)`, at least 4. Constructors reduce it
//! to the capacity when the capacity is smaller, since every shard needs room
//! for at least one entry.

mod lfu;

pub use self::lfu::{ConcurrentPinnedLfuCache, ShardHandle};

/// Returns the default number of segments based on CPU count.
#[inline]
pub fn default_segment_count() -> usize {
    let cpus = std::thread::available_parallelism().map_or(4, |n| n.get());
    (cpus * 4).clamp(4, 64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_segment_count_bounds() {
        let count = default_segment_count();
        assert!((4..=64).contains(&count));
    }
}
