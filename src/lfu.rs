//! Pinned Least Frequently Used Cache Implementation.
//!
//! [`PinnedLfuCache`] evicts the least frequently used entry among those that
//! are not pinned, and never evicts an entry while any caller holds a pin on
//! it. It is meant to sit under a buffer manager or block cache, where callers
//! pin a slot, fill or read it, and release it when done.
//!
//! # Structure
//!
//! ```text
//!   index: HashMap<K, SlotId>          entries: Slab<Entry<K, V>>
//!   ┌──────┬────────┐                  ┌────────┬───────────────────────────┐
//!   │ key  │ slot   │ ───────────────► │ slot   │ key, value, freq, pins    │
//!   └──────┴────────┘                  └────────┴───────────────────────────┘
//!
//!   ledger (pins == 0 only)            in use (pins > 0)
//!   freq=1: [k8] [k9]                  implicit: entries absent from the
//!   freq=5: [k5]                       ledger with a positive pin count
//! ```
//!
//! # Access rules
//!
//! - Every access by key (`insert` hit, `lookup` hit) and every `release`
//!   raises the entry's frequency by exactly one.
//! - A pinned entry leaves the ledger; the release that drops its last pin
//!   puts it back at the tail of the bucket for its new frequency.
//! - Admission into a full cache evicts the front of the lowest non-empty
//!   bucket. If every resident entry is pinned, admission is denied and the
//!   cache is left unchanged.
//! - [`erase`](PinnedLfuCache::erase) and [`install`](PinnedLfuCache::install)
//!   shrink and grow the capacity by one along with the entry count.
//!
//! # Example
//!
//! ```
//! use pincache::PinnedLfuCache;
//!
//! let mut cache: PinnedLfuCache<u32, u64> = PinnedLfuCache::new(2).unwrap();
//!
//! let a = cache.insert(1, true).unwrap();
//! let b = cache.insert(2, true).unwrap();
//! *cache.value_mut(a).unwrap() = 10;
//!
//! // Both slots are pinned, nothing can be evicted.
//! assert!(cache.insert(3, true).is_none());
//!
//! cache.release(b);
//! let c = cache.insert(3, true).unwrap(); // evicts 2
//! assert!(cache.peek(&2).is_none());
//! assert_eq!(cache.value(a), Some(&10));
//! # cache.release(a);
//! # cache.release(c);
//! ```

extern crate alloc;

use crate::config::PinnedLfuConfig;
use crate::entry::Entry;
use crate::error::Result;
use crate::handle::Handle;
use crate::ledger::FrequencyLedger;
use crate::metrics::{CacheMetrics, PinnedLfuMetrics};
use crate::slab::{Slab, SlotId};
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use log::{debug, trace, warn};

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// An LFU cache whose entries can be pinned against eviction.
///
/// Keys must be `Hash + Eq + Clone`; the key is stored both in the index and
/// in the entry. The hash strategy `S` is a compile-time parameter; see
/// [`crate::hash`] for integer-key strategies.
///
/// Admission creates values with `V::default()`; callers fill them through
/// [`value_mut`](Self::value_mut).
pub struct PinnedLfuCache<K, V, S = DefaultHashBuilder> {
    capacity: usize,
    index: HashMap<K, SlotId, S>,
    entries: Slab<Entry<K, V>>,
    ledger: FrequencyLedger,
    metrics: PinnedLfuMetrics,
}

impl<K, V> PinnedLfuCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`](crate::Error::InvalidConfig) if `capacity`
    /// is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::init(PinnedLfuConfig { capacity }, None)
    }
}

impl<K, V, S> PinnedLfuCache<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    /// Creates a cache from `config`, using `hasher` or `S::default()`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`](crate::Error::InvalidConfig) if the config
    /// does not validate.
    pub fn init(config: PinnedLfuConfig, hasher: Option<S>) -> Result<Self>
    where
        S: Default,
    {
        Self::with_hasher(config.capacity, hasher.unwrap_or_default())
    }

    /// Creates a cache with an explicit hash builder.
    pub fn with_hasher(capacity: usize, hash_builder: S) -> Result<Self> {
        PinnedLfuConfig { capacity }.validate()?;
        Ok(PinnedLfuCache {
            capacity,
            index: HashMap::with_capacity_and_hasher(capacity, hash_builder),
            entries: Slab::with_capacity(capacity),
            ledger: FrequencyLedger::new(),
            metrics: PinnedLfuMetrics::default(),
        })
    }

    /// Drops every entry and starts over with `capacity`.
    ///
    /// Handles issued before the reset become stale. On error the cache is
    /// left untouched.
    pub fn reset(&mut self, capacity: usize) -> Result<()> {
        PinnedLfuConfig { capacity }.validate()?;
        let pinned = self.pinned_len();
        if pinned > 0 {
            debug!("reset discards {} pinned entries", pinned);
        }
        self.index.clear();
        self.index.reserve(capacity);
        self.entries.clear();
        self.ledger.clear();
        self.capacity = capacity;
        self.metrics = PinnedLfuMetrics::default();
        debug!("cache reset to capacity {}", capacity);
        Ok(())
    }

    /// Number of resident entries, pinned and unpinned.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entry is resident.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.len() == 0
    }

    /// Current admission budget.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries eligible for eviction.
    #[inline]
    pub fn unpinned_len(&self) -> usize {
        self.ledger.len()
    }

    /// Number of entries with at least one outstanding pin.
    #[inline]
    pub fn pinned_len(&self) -> usize {
        self.len() - self.ledger.len()
    }

    /// Frequency of the next eviction victim, if any entry is unpinned.
    #[inline]
    pub fn min_frequency(&self) -> Option<u64> {
        self.ledger.min_frequency()
    }

    /// Returns the metrics collected since construction or the last reset.
    #[inline]
    pub fn stats(&self) -> &PinnedLfuMetrics {
        &self.metrics
    }

    /// Admits `key`, or accesses it if already resident.
    ///
    /// With `pin`, the returned handle carries one pin that must be given back
    /// through [`release`](Self::release).
    ///
    /// Returns `None` when the cache is full and every resident entry is
    /// pinned. The cache is unchanged in that case.
    pub fn insert(&mut self, key: K, pin: bool) -> Option<Handle>
    where
        V: Default,
    {
        if let Some(&id) = self.index.get(&key) {
            self.metrics.core.record_hit();
            self.touch(id, pin);
            return Some(Handle::new(id));
        }

        self.metrics.core.record_miss();
        if self.len() >= self.capacity && self.pop().is_none() {
            self.metrics.admissions_denied += 1;
            debug!(
                "admission denied: all {} resident entries are pinned",
                self.len()
            );
            return None;
        }
        Some(self.admit(key, pin))
    }

    /// Accesses `key` if resident, optionally pinning it.
    ///
    /// A miss returns `None` and creates nothing.
    pub fn lookup<Q>(&mut self, key: &Q, pin: bool) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.index.get(key).copied() {
            Some(id) => {
                self.metrics.core.record_hit();
                self.touch(id, pin);
                Some(Handle::new(id))
            }
            None => {
                self.metrics.core.record_miss();
                None
            }
        }
    }

    /// Gives back one pin taken through `handle`.
    ///
    /// Counts as an access. When the last pin is released the entry becomes
    /// evictable again, queued behind the entries already at its frequency.
    ///
    /// Releasing a stale handle, or an entry with no outstanding pin, is
    /// ignored and returns `false`.
    pub fn release(&mut self, handle: Handle) -> bool {
        let id = handle.slot();
        let Some(entry) = self.entries.get_mut(id) else {
            warn!("ignoring release of a stale handle");
            self.metrics.misuse_ignored += 1;
            return false;
        };
        if entry.pins == 0 {
            warn!("ignoring release of an entry with no outstanding pin");
            self.metrics.misuse_ignored += 1;
            return false;
        }

        entry.pins -= 1;
        entry.frequency += 1;
        let frequency = entry.frequency;
        if entry.pins == 0 {
            self.ledger.insert_at(&mut self.entries, id, frequency);
            trace!("entry unpinned at frequency {}", frequency);
        }
        self.metrics.releases += 1;
        self.metrics.record_frequency(frequency);
        true
    }

    /// Forcibly removes an unpinned entry and shrinks the capacity by one.
    ///
    /// Returns `false` and changes nothing if the entry is pinned or the
    /// handle is stale.
    pub fn erase(&mut self, handle: Handle) -> bool {
        let id = handle.slot();
        let pinned = match self.entries.get(id) {
            Some(entry) => entry.is_pinned(),
            None => {
                warn!("ignoring erase of a stale handle");
                self.metrics.misuse_ignored += 1;
                return false;
            }
        };
        if pinned {
            self.metrics.removals_denied += 1;
            debug!("erase denied: entry is pinned");
            return false;
        }

        self.ledger.remove(&mut self.entries, id);
        let Some(entry) = self.entries.remove(id) else {
            return false;
        };
        self.index.remove(&entry.key);
        self.capacity -= 1;
        self.metrics.erasures += 1;
        debug!("erased entry, capacity now {}", self.capacity);
        true
    }

    /// Forcibly admits `key`, growing the capacity by one.
    ///
    /// The new entry is unpinned at frequency 1. If `key` is already resident
    /// this is a no-op returning the existing handle: no access is recorded
    /// and the capacity does not change.
    pub fn install(&mut self, key: K) -> Handle
    where
        V: Default,
    {
        if let Some(&id) = self.index.get(&key) {
            debug!("install of a resident key returns the existing entry");
            return Handle::new(id);
        }
        self.capacity += 1;
        self.metrics.installs += 1;
        let handle = self.admit(key, false);
        debug!("installed entry, capacity now {}", self.capacity);
        handle
    }

    /// Evicts the current victim and returns it. The capacity is unchanged.
    ///
    /// Returns `None` if every resident entry is pinned.
    pub fn pop(&mut self) -> Option<(K, V)> {
        let victim = self.ledger.pop_minimum(&mut self.entries)?;
        let entry = self.entries.remove(victim)?;
        self.index.remove(&entry.key);
        self.metrics.core.record_eviction();
        trace!("evicted entry at frequency {}", entry.frequency);
        Some((entry.key, entry.value))
    }

    /// Moves the capacity to `capacity`, evicting victims while more entries
    /// are resident than the new capacity allows.
    ///
    /// Pinned entries are never evicted, so the capacity stops at the number
    /// of resident entries once only pinned ones remain. Returns the evicted
    /// entries in eviction order.
    pub fn resize(&mut self, capacity: usize) -> Vec<(K, V)> {
        let mut evicted = Vec::new();
        while self.len() > capacity {
            match self.pop() {
                Some(pair) => evicted.push(pair),
                None => break,
            }
        }
        self.capacity = capacity.max(self.len());
        debug!(
            "resized to capacity {} with {} evictions",
            self.capacity,
            evicted.len()
        );
        evicted
    }

    /// Calls `f` once per resident entry, pinned or not, in index order.
    ///
    /// The order is unspecified and must not be relied on.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        for &id in self.index.values() {
            if let Some(entry) = self.entries.get(id) {
                f(&entry.key, &entry.value);
            }
        }
    }

    /// Calls `f` once per unpinned entry in eviction order: lowest frequency
    /// first, oldest first within a frequency.
    pub fn for_each_lfu<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        for (_, entry) in self.ledger.iter(&self.entries) {
            f(&entry.key, &entry.value);
        }
    }

    /// Snapshot of the unpinned working set in eviction order.
    ///
    /// Replaying it through [`recover`](Self::recover) restores the same keys,
    /// values and relative order; frequencies are not preserved.
    pub fn checkpoint(&self) -> Vec<(K, V)>
    where
        V: Clone,
    {
        let mut snapshot = Vec::with_capacity(self.ledger.len());
        self.for_each_lfu(|key, value| snapshot.push((key.clone(), value.clone())));
        snapshot
    }

    /// Builds a cache from `config` and replays `entries` into it, each as a
    /// pinned insert, a value write and a release.
    ///
    /// Every recovered entry ends up at the same frequency, queued in replay
    /// order.
    pub fn recover<I>(config: PinnedLfuConfig, hasher: Option<S>, entries: I) -> Result<Self>
    where
        S: Default,
        V: Default,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut cache = Self::init(config, hasher)?;
        let mut restored = 0usize;
        for (key, value) in entries {
            let Some(handle) = cache.insert(key, true) else {
                continue;
            };
            if let Some(slot) = cache.value_mut(handle) {
                *slot = value;
            }
            cache.release(handle);
            restored += 1;
        }
        debug!("recovered {} entries from checkpoint", restored);
        Ok(cache)
    }

    /// Handle for `key` without recording an access.
    pub fn peek<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.index.get(key).map(|&id| Handle::new(id))
    }

    /// Returns `true` if `key` is resident. Does not record an access.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.index.contains_key(key)
    }

    /// Key of the entry behind `handle`.
    #[inline]
    pub fn key(&self, handle: Handle) -> Option<&K> {
        self.entries.get(handle.slot()).map(|entry| &entry.key)
    }

    /// Value of the entry behind `handle`.
    #[inline]
    pub fn value(&self, handle: Handle) -> Option<&V> {
        self.entries.get(handle.slot()).map(|entry| &entry.value)
    }

    /// Mutable value of the entry behind `handle`.
    #[inline]
    pub fn value_mut(&mut self, handle: Handle) -> Option<&mut V> {
        self.entries
            .get_mut(handle.slot())
            .map(|entry| &mut entry.value)
    }

    /// Access frequency of the entry behind `handle`.
    #[inline]
    pub fn frequency(&self, handle: Handle) -> Option<u64> {
        self.entries.get(handle.slot()).map(|entry| entry.frequency)
    }

    /// Outstanding pins on the entry behind `handle`.
    #[inline]
    pub fn pin_count(&self, handle: Handle) -> Option<usize> {
        self.entries.get(handle.slot()).map(|entry| entry.pins)
    }

    /// Hit path shared by `insert` and `lookup`: one frequency step, plus a
    /// pin if requested.
    fn touch(&mut self, id: SlotId, pin: bool) {
        let Some(pinned) = self.entries.get(id).map(Entry::is_pinned) else {
            return;
        };

        let frequency = if pinned || pin {
            if !pinned {
                self.ledger.remove(&mut self.entries, id);
            }
            let Some(entry) = self.entries.get_mut(id) else {
                return;
            };
            entry.frequency += 1;
            if pin {
                entry.pins += 1;
            }
            entry.frequency
        } else {
            match self.ledger.bump(&mut self.entries, id) {
                Some(frequency) => frequency,
                None => return,
            }
        };

        if pin {
            self.metrics.pins += 1;
            trace!("entry pinned at frequency {}", frequency);
        }
        self.metrics.record_frequency(frequency);
    }

    /// Creates a frequency-1 entry for a key known to be absent.
    fn admit(&mut self, key: K, pin: bool) -> Handle
    where
        V: Default,
    {
        let id = self
            .entries
            .insert(Entry::new(key.clone(), V::default(), usize::from(pin)));
        if pin {
            self.metrics.pins += 1;
        } else {
            self.ledger.insert_at(&mut self.entries, id, 1);
        }
        self.index.insert(key, id);
        self.metrics.core.record_insertion();
        self.metrics.record_frequency(1);
        Handle::new(id)
    }
}

impl<K, V, S> CacheMetrics for PinnedLfuCache<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    fn metrics(&self) -> BTreeMap<String, f64> {
        let mut metrics = self.metrics.clone();
        metrics.update_ledger(self.ledger.len(), self.ledger.bucket_count());
        metrics.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        self.metrics.algorithm_name()
    }
}

impl<K, V, S> fmt::Debug for PinnedLfuCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinnedLfuCache")
            .field("capacity", &self.capacity)
            .field("len", &self.entries.len())
            .field("unpinned", &self.ledger.len())
            .field("min_frequency", &self.ledger.min_frequency())
            .finish()
    }
}
