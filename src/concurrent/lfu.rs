//! Concurrent Pinned LFU Cache Implementation
//!
//! A thread-safe wrapper around [`PinnedLfuCache`](crate::PinnedLfuCache)
//! using lock striping: the key space is split across shards, each an
//! independent engine behind its own `parking_lot::Mutex`.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                    ConcurrentPinnedLfuCache                          │
//! │                                                                      │
//! │  hash(key) % N  ──▶  Shard Selection                                 │
//! │                                                                      │
//! │  ┌──────────────┐ ┌──────────────┐     ┌──────────────┐              │
//! │  │   Shard 0    │ │   Shard 1    │ ... │  Shard N-1   │              │
//! │  │  Mutex<      │ │  Mutex<      │     │  Mutex<      │              │
//! │  │   Pinned-    │ │   Pinned-    │     │   Pinned-    │              │
//! │  │   LfuCache>  │ │   LfuCache>  │     │   LfuCache>  │              │
//! │  └──────────────┘ └──────────────┘     └──────────────┘              │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Capacity, eviction, pinning and the erase/install capacity adjustments are
//! all per shard. A full shard denies admission when all of its own entries
//! are pinned, even if other shards have room.
//!
//! Handles are [`ShardHandle`]s: the engine handle plus the shard it came
//! from. Values are reached through [`with_value`](ConcurrentPinnedLfuCache::with_value)
//! and [`with_value_mut`](ConcurrentPinnedLfuCache::with_value_mut), which
//! hold the shard lock only for the duration of the closure.
//!
//! # Example
//!
//! ```
//! use pincache::concurrent::ConcurrentPinnedLfuCache;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let cache: Arc<ConcurrentPinnedLfuCache<u64, u64>> =
//!     Arc::new(ConcurrentPinnedLfuCache::with_segments(1024, 8).unwrap());
//!
//! let workers: Vec<_> = (0..4u64)
//!     .map(|t| {
//!         let cache = Arc::clone(&cache);
//!         thread::spawn(move || {
//!             for block in (t * 100)..(t * 100 + 100) {
//!                 if let Some(h) = cache.insert(block, true) {
//!                     cache.with_value_mut(h, |v| *v = block * 2);
//!                     cache.release(h);
//!                 }
//!             }
//!         })
//!     })
//!     .collect();
//!
//! for worker in workers {
//!     worker.join().unwrap();
//! }
//! assert_eq!(cache.len(), 400);
//! ```

extern crate alloc;

use crate::config::{ConcurrentCacheConfig, ConcurrentPinnedLfuConfig, PinnedLfuConfig};
use crate::error::Result;
use crate::handle::Handle;
use crate::lfu::PinnedLfuCache;
use crate::metrics::{self, CacheMetrics};
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use log::debug;
use parking_lot::Mutex;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

use super::default_segment_count;

/// A [`Handle`] tagged with the shard that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShardHandle {
    shard: usize,
    handle: Handle,
}

impl ShardHandle {
    /// Index of the shard holding the entry.
    #[inline]
    pub fn shard(self) -> usize {
        self.shard
    }

    /// Engine handle within that shard.
    #[inline]
    pub fn handle(self) -> Handle {
        self.handle
    }
}

/// A thread-safe pinned LFU cache with sharded storage.
pub struct ConcurrentPinnedLfuCache<K, V, S = DefaultHashBuilder> {
    segments: Box<[Mutex<PinnedLfuCache<K, V, S>>]>,
    hash_builder: S,
}

impl<K, V> ConcurrentPinnedLfuCache<K, V, DefaultHashBuilder>
where
    K: Hash + Eq + Clone,
{
    /// Creates a cache of total `capacity` with the default shard count,
    /// reduced to `capacity` if smaller.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_segments(capacity, default_segment_count().min(capacity.max(1)))
    }

    /// Creates a cache of total `capacity` split over `segments` shards.
    pub fn with_segments(capacity: usize, segments: usize) -> Result<Self> {
        let config = ConcurrentCacheConfig {
            base: PinnedLfuConfig { capacity },
            segments,
        };
        Self::init(config, None)
    }
}

impl<K, V, S> ConcurrentPinnedLfuCache<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher + Clone,
{
    /// Creates a cache from `config`. Every shard gets a clone of the hasher.
    pub fn init(config: ConcurrentPinnedLfuConfig, hasher: Option<S>) -> Result<Self>
    where
        S: Default,
    {
        config.validate()?;
        let hash_builder = hasher.unwrap_or_default();

        let mut segments = Vec::with_capacity(config.segments);
        for index in 0..config.segments {
            let shard = PinnedLfuCache::with_hasher(
                config.shard_capacity(index),
                hash_builder.clone(),
            )?;
            segments.push(Mutex::new(shard));
        }
        debug!(
            "concurrent cache created: capacity {}, {} shards",
            config.base.capacity, config.segments
        );

        Ok(Self {
            segments: segments.into_boxed_slice(),
            hash_builder,
        })
    }

    #[inline]
    fn segment_index<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        // Bits 40..64 leave the low bits for the shard's own bucket index.
        ((self.hash_builder.hash_one(key) >> 40) as usize) % self.segments.len()
    }

    /// Returns the total capacity across all shards.
    pub fn capacity(&self) -> usize {
        self.segments.iter().map(|s| s.lock().capacity()).sum()
    }

    /// Returns the number of shards.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Returns the total number of resident entries.
    pub fn len(&self) -> usize {
        self.segments.iter().map(|s| s.lock().len()).sum()
    }

    /// Returns `true` if no shard holds an entry.
    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.lock().is_empty())
    }

    /// Admits or accesses `key` in its shard.
    ///
    /// See [`PinnedLfuCache::insert`].
    pub fn insert(&self, key: K, pin: bool) -> Option<ShardHandle>
    where
        V: Default,
    {
        let shard = self.segment_index(&key);
        let handle = self.segments[shard].lock().insert(key, pin)?;
        Some(ShardHandle { shard, handle })
    }

    /// Accesses `key` in its shard if resident.
    pub fn lookup<Q>(&self, key: &Q, pin: bool) -> Option<ShardHandle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let shard = self.segment_index(key);
        let handle = self.segments[shard].lock().lookup(key, pin)?;
        Some(ShardHandle { shard, handle })
    }

    /// Returns one pin. See [`PinnedLfuCache::release`].
    pub fn release(&self, handle: ShardHandle) -> bool {
        match self.segments.get(handle.shard) {
            Some(segment) => segment.lock().release(handle.handle),
            None => false,
        }
    }

    /// Forcibly removes an unpinned entry, shrinking its shard by one.
    pub fn erase(&self, handle: ShardHandle) -> bool {
        match self.segments.get(handle.shard) {
            Some(segment) => segment.lock().erase(handle.handle),
            None => false,
        }
    }

    /// Forcibly admits `key`, growing its shard by one.
    pub fn install(&self, key: K) -> ShardHandle
    where
        V: Default,
    {
        let shard = self.segment_index(&key);
        let handle = self.segments[shard].lock().install(key);
        ShardHandle { shard, handle }
    }

    /// Returns `true` if `key` is resident. Does not record an access.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let shard = self.segment_index(key);
        self.segments[shard].lock().contains(key)
    }

    /// Applies `f` to the value behind `handle` while holding its shard lock.
    ///
    /// Returns `None` for a stale handle.
    pub fn with_value<F, R>(&self, handle: ShardHandle, f: F) -> Option<R>
    where
        F: FnOnce(&V) -> R,
    {
        let segment = self.segments.get(handle.shard)?.lock();
        segment.value(handle.handle).map(f)
    }

    /// Applies `f` to the value behind `handle` mutably while holding its
    /// shard lock.
    pub fn with_value_mut<F, R>(&self, handle: ShardHandle, f: F) -> Option<R>
    where
        F: FnOnce(&mut V) -> R,
    {
        let mut segment = self.segments.get(handle.shard)?.lock();
        segment.value_mut(handle.handle).map(f)
    }

    /// Visits every resident entry, one shard at a time.
    ///
    /// Each shard is locked while it is visited; `f` must not call back into
    /// the cache.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        for segment in self.segments.iter() {
            segment.lock().for_each(&mut f);
        }
    }

    /// Visits unpinned entries in per-shard eviction order, shard by shard.
    pub fn for_each_lfu<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        for segment in self.segments.iter() {
            segment.lock().for_each_lfu(&mut f);
        }
    }

    /// Snapshot of every shard's unpinned working set, in shard order.
    pub fn checkpoint(&self) -> Vec<(K, V)>
    where
        V: Clone,
    {
        let mut snapshot = Vec::new();
        for segment in self.segments.iter() {
            snapshot.extend(segment.lock().checkpoint());
        }
        snapshot
    }
}

impl<K, V, S> CacheMetrics for ConcurrentPinnedLfuCache<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher + Clone,
{
    fn metrics(&self) -> BTreeMap<String, f64> {
        metrics::aggregate(self.segments.iter().map(|segment| segment.lock().metrics()))
    }

    fn algorithm_name(&self) -> &'static str {
        "ConcurrentPinnedLFU"
    }
}

impl<K, V, S> core::fmt::Debug for ConcurrentPinnedLfuCache<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher + Clone,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConcurrentPinnedLfuCache")
            .field("segment_count", &self.segments.len())
            .field("total_len", &self.len())
            .finish()
    }
}
