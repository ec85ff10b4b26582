//! Cache Configuration Module
//!
//! Configuration structs have public fields and are passed to the cache's
//! `init` constructor, which validates them:
//!
//! | Config | Cache | Description |
//! |--------|-------|-------------|
//! | `PinnedLfuConfig` | [`PinnedLfuCache`](crate::PinnedLfuCache) | Single-threaded engine |
//! | `ConcurrentPinnedLfuConfig` | `ConcurrentPinnedLfuCache` | Sharded, lock-per-shard wrapper (feature `concurrent`) |
//! | `SharedPinnedLfuConfig` | [`SharedPinnedLfuCache`](crate::SharedPinnedLfuCache) | One engine per tenant, capacity movable between tenants |
//!
//! # Sizing
//!
//! `capacity` counts entries, not bytes. For a block cache, set it to the
//! number of blocks the buffer pool can hold:
//!
//! ```text
//! capacity = pool_bytes / block_size
//! ```
//!
//! Each entry additionally costs the key, the slot generation, the pin and
//! frequency counters and two link indices.
//!
//! # Examples
//!
//! ```
//! use pincache::config::PinnedLfuConfig;
//! use pincache::PinnedLfuCache;
//!
//! // 1GB working set of 64KB blocks
//! let config = PinnedLfuConfig {
//!     capacity: (1 << 30) / (64 << 10),
//! };
//! let cache: PinnedLfuCache<u32, u64> = PinnedLfuCache::init(config, None).unwrap();
//! assert_eq!(cache.capacity(), 16 * 1024);
//! ```

pub mod lfu;
pub mod shared;

pub use lfu::PinnedLfuConfig;
pub use shared::SharedPinnedLfuConfig;

#[cfg(feature = "concurrent")]
use crate::error::{Error, Result};

/// Generic configuration wrapper for concurrent caches.
///
/// Wraps a base cache configuration and adds the `segments` field controlling
/// how many independently locked shards the key space is split across.
///
/// # Sizing Note
///
/// The `capacity` in the base config applies to the **entire cache**. It is
/// split across shards, with the remainder going to the lowest-numbered
/// shards, so the shard capacities always sum to the configured total.
///
/// # Example
///
/// ```ignore
/// use pincache::config::{ConcurrentCacheConfig, ConcurrentPinnedLfuConfig, PinnedLfuConfig};
///
/// let config: ConcurrentPinnedLfuConfig = ConcurrentCacheConfig {
///     base: PinnedLfuConfig { capacity: 10_000 },
///     segments: 16,
/// };
/// ```
#[cfg(feature = "concurrent")]
#[derive(Clone, Copy)]
pub struct ConcurrentCacheConfig<C> {
    /// Base configuration for the per-shard engine.
    pub base: C,
    /// Number of segments for sharding (more segments = less contention)
    pub segments: usize,
}

#[cfg(feature = "concurrent")]
impl<C: core::fmt::Debug> core::fmt::Debug for ConcurrentCacheConfig<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConcurrentCacheConfig")
            .field("base", &self.base)
            .field("segments", &self.segments)
            .finish()
    }
}

/// Configuration for a concurrent pinned LFU cache.
/// Type alias for `ConcurrentCacheConfig<PinnedLfuConfig>`.
#[cfg(feature = "concurrent")]
pub type ConcurrentPinnedLfuConfig = ConcurrentCacheConfig<PinnedLfuConfig>;

#[cfg(feature = "concurrent")]
impl ConcurrentPinnedLfuConfig {
    /// Checks the base config and the shard layout.
    pub fn validate(&self) -> Result<()> {
        self.base.validate()?;
        if self.segments == 0 {
            return Err(Error::InvalidConfig("segments must be greater than zero"));
        }
        if self.base.capacity < self.segments {
            return Err(Error::InvalidConfig("capacity must be >= segment count"));
        }
        Ok(())
    }

    /// Capacity assigned to shard `index`.
    pub fn shard_capacity(&self, index: usize) -> usize {
        let per_shard = self.base.capacity / self.segments;
        let remainder = self.base.capacity % self.segments;
        per_shard + usize::from(index < remainder)
    }
}
