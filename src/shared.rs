//! Multi-tenant cache built from one pinned LFU engine per tenant.
//!
//! Each tenant is identified by a small `Copy` tag and owns a
//! [`PinnedLfuCache`] with its own capacity. All tenants share one key space:
//! a key is resident in at most one tenant, and an access through any tag
//! reaches the tenant that currently holds the key.
//!
//! ```text
//!   owners: HashMap<K, T>              tenants: HashMap<T, PinnedLfuCache>
//!   ┌──────┬───────┐                   ┌───────┬──────────────────────────┐
//!   │ 2    │ 537   │ ────────────────► │ 537   │ capacity 3: [5] [1] [2]  │
//!   │ 4    │ 564   │ ────────────────► │ 564   │ capacity 2: [4] [6]      │
//!   └──────┴───────┘                   └───────┴──────────────────────────┘
//! ```
//!
//! Capacity moves between tenants without touching the others:
//!
//! - [`relocate`](SharedPinnedLfuCache::relocate) shrinks one tenant, evicting
//!   its victims as needed, and grows another by the same amount.
//! - [`export_node`](SharedPinnedLfuCache::export_node) erases one unpinned
//!   entry together with its slot.
//! - [`import_node`](SharedPinnedLfuCache::import_node) installs a key into a
//!   tenant together with a new slot.
//!
//! ```
//! use pincache::SharedPinnedLfuCache;
//!
//! let mut cache: SharedPinnedLfuCache<u8, u64, u64> =
//!     SharedPinnedLfuCache::new([(1, 2), (2, 2)]).unwrap();
//!
//! let h = cache.insert(1, 10, true).unwrap();
//! *cache.value_mut(h).unwrap() = 100;
//! cache.release(h);
//!
//! // Key 10 lives in tenant 1; an insert through tenant 2 finds it there.
//! let again = cache.insert(2, 10, false).unwrap();
//! assert_eq!(again.tag(), 1);
//! assert_eq!(cache.value(again), Some(&100));
//!
//! assert_eq!(cache.relocate(1, 2, 1), 1);
//! assert_eq!(cache.tenant(2).unwrap().capacity(), 3);
//! ```

extern crate alloc;

use crate::config::SharedPinnedLfuConfig;
use crate::error::Result;
use crate::handle::Handle;
use crate::lfu::PinnedLfuCache;
use crate::metrics::{self, CacheMetrics};
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use log::{debug, warn};

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// Handle to an entry of one tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TenantHandle<T> {
    tag: T,
    handle: Handle,
}

impl<T: Copy> TenantHandle<T> {
    /// Tag of the tenant holding the entry.
    #[inline]
    pub fn tag(self) -> T {
        self.tag
    }

    /// Handle within that tenant's engine.
    #[inline]
    pub fn handle(self) -> Handle {
        self.handle
    }
}

/// Pinned LFU engines for several tenants over one shared key space.
pub struct SharedPinnedLfuCache<T, K, V, S = DefaultHashBuilder> {
    tenants: HashMap<T, PinnedLfuCache<K, V, S>, S>,
    owners: HashMap<K, T, S>,
    tags: Vec<T>,
}

impl<T, K, V> SharedPinnedLfuCache<T, K, V>
where
    T: Hash + Eq + Copy,
    K: Hash + Eq + Clone,
{
    /// Creates one tenant per `(tag, capacity)` pair.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`](crate::Error::InvalidConfig) if there is no
    /// tenant, a capacity is zero or a tag repeats.
    pub fn new<I>(tenants: I) -> Result<Self>
    where
        I: IntoIterator<Item = (T, usize)>,
    {
        let config = SharedPinnedLfuConfig {
            tenants: tenants.into_iter().collect(),
        };
        Self::init(config, None)
    }
}

impl<T, K, V, S> SharedPinnedLfuCache<T, K, V, S>
where
    T: Hash + Eq + Copy,
    K: Hash + Eq + Clone,
    S: BuildHasher + Clone,
{
    /// Creates the tenants listed in `config`, each hashing with a clone of
    /// `hasher` or `S::default()`.
    pub fn init(config: SharedPinnedLfuConfig<T>, hasher: Option<S>) -> Result<Self>
    where
        S: Default,
    {
        config.validate()?;
        let hash_builder = hasher.unwrap_or_default();

        let mut tenants =
            HashMap::with_capacity_and_hasher(config.tenants.len(), hash_builder.clone());
        let mut tags = Vec::with_capacity(config.tenants.len());
        for &(tag, capacity) in &config.tenants {
            tenants.insert(tag, PinnedLfuCache::with_hasher(capacity, hash_builder.clone())?);
            tags.push(tag);
        }
        let owners = HashMap::with_capacity_and_hasher(config.total_capacity(), hash_builder);

        debug!(
            "shared cache with {} tenants, total capacity {}",
            tags.len(),
            config.total_capacity()
        );
        Ok(SharedPinnedLfuCache {
            tenants,
            owners,
            tags,
        })
    }

    /// Number of resident entries across all tenants.
    #[inline]
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Returns `true` if no tenant holds an entry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Sum of the tenant capacities. Relocation never changes it; export and
    /// import lower and raise it by one.
    pub fn capacity(&self) -> usize {
        self.tenants.values().map(PinnedLfuCache::capacity).sum()
    }

    /// Tenant tags in configuration order.
    pub fn tags(&self) -> &[T] {
        &self.tags
    }

    /// The engine of tenant `tag`, for inspection.
    pub fn tenant(&self, tag: T) -> Option<&PinnedLfuCache<K, V, S>> {
        self.tenants.get(&tag)
    }

    /// Tag of the tenant holding `key`.
    pub fn owner<Q>(&self, key: &Q) -> Option<T>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.owners.get(key).copied()
    }

    /// Returns `true` if any tenant holds `key`. Does not record an access.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.owners.contains_key(key)
    }

    /// Admits `key` into tenant `tag`, or accesses it in whichever tenant
    /// already holds it.
    ///
    /// A full tenant evicts its own victim. Returns `None` for an unknown
    /// tag, or when the tenant is full and every one of its entries is
    /// pinned.
    pub fn insert(&mut self, tag: T, key: K, pin: bool) -> Option<TenantHandle<T>>
    where
        V: Default,
    {
        if let Some(&owner) = self.owners.get(&key) {
            let handle = self.tenants.get_mut(&owner)?.insert(key, pin)?;
            return Some(TenantHandle { tag: owner, handle });
        }

        let Some(cache) = self.tenants.get_mut(&tag) else {
            warn!("ignoring insert into an unknown tenant");
            return None;
        };
        if cache.len() >= cache.capacity() {
            if let Some((victim, _)) = cache.pop() {
                self.owners.remove(&victim);
            }
        }
        let handle = cache.insert(key.clone(), pin)?;
        self.owners.insert(key, tag);
        Some(TenantHandle { tag, handle })
    }

    /// Accesses `key` in the tenant holding it, optionally pinning it.
    pub fn lookup<Q>(&mut self, key: &Q, pin: bool) -> Option<TenantHandle<T>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let owner = self.owner(key)?;
        let handle = self.tenants.get_mut(&owner)?.lookup(key, pin)?;
        Some(TenantHandle { tag: owner, handle })
    }

    /// Gives back one pin taken through `handle`.
    pub fn release(&mut self, handle: TenantHandle<T>) -> bool {
        match self.tenants.get_mut(&handle.tag) {
            Some(cache) => cache.release(handle.handle),
            None => {
                warn!("ignoring release into an unknown tenant");
                false
            }
        }
    }

    /// Moves up to `slots` units of capacity from tenant `src` to tenant
    /// `dst` and returns how many moved.
    ///
    /// `src` gives up unused room first and then evicts its victims. Fewer
    /// than `slots` move when `src` runs out of unpinned entries.
    pub fn relocate(&mut self, src: T, dst: T, slots: usize) -> usize {
        if src == dst || !self.tenants.contains_key(&dst) {
            warn!("ignoring relocation to the same or an unknown tenant");
            return 0;
        }
        let Some(source) = self.tenants.get_mut(&src) else {
            warn!("ignoring relocation from an unknown tenant");
            return 0;
        };

        let before = source.capacity();
        let evicted = source.resize(before.saturating_sub(slots));
        let moved = before - source.capacity();
        for (key, _) in evicted {
            self.owners.remove(&key);
        }

        if let Some(target) = self.tenants.get_mut(&dst) {
            let capacity = target.capacity() + moved;
            target.resize(capacity);
        }
        debug!("relocated {} of {} requested slots", moved, slots);
        moved
    }

    /// Erases the unpinned entry behind `handle` along with its slot.
    ///
    /// Returns `false` if the entry is pinned or the handle is stale.
    pub fn export_node(&mut self, handle: TenantHandle<T>) -> bool {
        let Some(cache) = self.tenants.get_mut(&handle.tag) else {
            warn!("ignoring export from an unknown tenant");
            return false;
        };
        let key = cache.key(handle.handle).cloned();
        if !cache.erase(handle.handle) {
            return false;
        }
        if let Some(key) = key {
            self.owners.remove(&key);
        }
        true
    }

    /// Installs `key` into tenant `tag` along with a new slot.
    ///
    /// A key already held by any tenant is left where it is and its existing
    /// handle is returned. Returns `None` only for an unknown tag.
    pub fn import_node(&mut self, tag: T, key: K) -> Option<TenantHandle<T>>
    where
        V: Default,
    {
        if let Some(&owner) = self.owners.get(&key) {
            debug!("import of a resident key returns the existing entry");
            let handle = self.tenants.get(&owner)?.peek(&key)?;
            return Some(TenantHandle { tag: owner, handle });
        }

        let Some(cache) = self.tenants.get_mut(&tag) else {
            warn!("ignoring import into an unknown tenant");
            return None;
        };
        let handle = cache.install(key.clone());
        self.owners.insert(key, tag);
        Some(TenantHandle { tag, handle })
    }

    /// Key of the entry behind `handle`.
    pub fn key(&self, handle: TenantHandle<T>) -> Option<&K> {
        self.tenants.get(&handle.tag)?.key(handle.handle)
    }

    /// Value of the entry behind `handle`.
    pub fn value(&self, handle: TenantHandle<T>) -> Option<&V> {
        self.tenants.get(&handle.tag)?.value(handle.handle)
    }

    /// Mutable value of the entry behind `handle`.
    pub fn value_mut(&mut self, handle: TenantHandle<T>) -> Option<&mut V> {
        self.tenants.get_mut(&handle.tag)?.value_mut(handle.handle)
    }
}

impl<T, K, V, S> CacheMetrics for SharedPinnedLfuCache<T, K, V, S>
where
    T: Hash + Eq + Copy,
    K: Hash + Eq + Clone,
    S: BuildHasher + Clone,
{
    fn metrics(&self) -> BTreeMap<String, f64> {
        metrics::aggregate(self.tenants.values().map(CacheMetrics::metrics))
    }

    fn algorithm_name(&self) -> &'static str {
        "SharedPinnedLFU"
    }
}

impl<T, K, V, S> fmt::Debug for SharedPinnedLfuCache<T, K, V, S>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedPinnedLfuCache")
            .field("tags", &self.tags)
            .field("len", &self.owners.len())
            .finish()
    }
}
