//! Resident cache entry.
//!
//! An [`Entry`] is the single record the cache keeps per resident key. It holds
//! the key and value together with the two counters that drive every cache
//! decision:
//!
//! - `frequency`: how many times the entry has been accessed. Starts at 1 and
//!   only ever grows.
//! - `pins`: how many outstanding pins protect the entry from eviction. The
//!   entry is eligible for eviction only while this is zero.
//!
//! The intrusive [`Links`] place an unpinned entry inside its frequency
//! bucket. A pinned entry keeps its links detached.

use crate::list::{Linked, Links};

/// One resident key/value pair with its access and pin bookkeeping.
#[derive(Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) frequency: u64,
    pub(crate) pins: usize,
    links: Links,
}

impl<K, V> Entry<K, V> {
    /// A fresh entry at frequency 1 with `pins` outstanding pins.
    pub(crate) fn new(key: K, value: V, pins: usize) -> Self {
        Entry {
            key,
            value,
            frequency: 1,
            pins,
            links: Links::default(),
        }
    }

    #[inline]
    pub(crate) fn is_pinned(&self) -> bool {
        self.pins > 0
    }
}

impl<K, V> Linked for Entry<K, V> {
    #[inline]
    fn links(&self) -> &Links {
        &self.links
    }

    #[inline]
    fn links_mut(&mut self) -> &mut Links {
        &mut self.links
    }
}
