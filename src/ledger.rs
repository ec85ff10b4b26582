//! Frequency ledger: the eviction order of unpinned entries.
//!
//! Every unpinned entry sits in exactly one bucket, the one matching its
//! access frequency. Buckets are FIFO lists, so among entries with the same
//! frequency the one that arrived in the bucket first leaves first.
//!
//! ```text
//!   min_frequency = 1                                max_frequency = 5
//!        │                                                 │
//!        ▼                                                 ▼
//!   freq=1 ◄──────► freq=2 ◄──────► freq=5
//!     │               │               │
//!   [k7] ◄──► [k3]  [k6]            [k5]             evicted first: k7
//! ```
//!
//! Buckets live in a map keyed by frequency and are chained to their
//! neighbours in ascending order. A bucket is dropped as soon as it empties,
//! so the head of the chain is always a non-empty bucket. Bumping an entry
//! knows its target's neighbours from the bucket it leaves, which keeps
//! `bump`, `remove` and `pop_minimum` O(1). `insert_at` is O(1) into an
//! existing bucket or below the minimum; a new bucket above the minimum is
//! placed by walking down from the highest frequency.
//!
//! Pinned entries are never in the ledger. Moving an entry between the ledger
//! and the in-use state is a plain `remove` / `insert_at` pair.

extern crate alloc;

use crate::entry::Entry;
use crate::list::List;
use crate::slab::{Slab, SlotId};

#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

#[derive(Debug, Default)]
struct Bucket {
    list: List,
    prev: Option<u64>,
    next: Option<u64>,
}

/// Frequency-bucketed FIFO queues over the entry arena.
#[derive(Debug, Default)]
pub(crate) struct FrequencyLedger {
    buckets: HashMap<u64, Bucket>,
    min_frequency: Option<u64>,
    max_frequency: Option<u64>,
    len: usize,
}

impl FrequencyLedger {
    pub(crate) fn new() -> Self {
        FrequencyLedger::default()
    }

    /// Number of unpinned entries tracked.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Lowest frequency with at least one entry.
    #[inline]
    pub(crate) fn min_frequency(&self) -> Option<u64> {
        self.min_frequency
    }

    /// Number of distinct non-empty frequency buckets.
    #[inline]
    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Appends `id` to the tail of the bucket for `frequency` and records that
    /// frequency on the entry.
    pub(crate) fn insert_at<K, V>(
        &mut self,
        slab: &mut Slab<Entry<K, V>>,
        id: SlotId,
        frequency: u64,
    ) -> bool {
        if slab.get(id).is_none() {
            return false;
        }
        let prev = if self.buckets.contains_key(&frequency) {
            None
        } else {
            self.predecessor(frequency)
        };
        self.push(slab, id, frequency, prev)
    }

    /// Detaches `id` from its bucket.
    pub(crate) fn remove<K, V>(&mut self, slab: &mut Slab<Entry<K, V>>, id: SlotId) -> bool {
        let frequency = match slab.get(id) {
            Some(entry) => entry.frequency,
            None => return false,
        };
        let Some(bucket) = self.buckets.get_mut(&frequency) else {
            return false;
        };
        if !bucket.list.unlink(slab, id) {
            return false;
        }
        self.len -= 1;

        if bucket.list.is_empty() {
            self.unlink_bucket(frequency);
        }
        true
    }

    /// Moves `id` to the tail of the next bucket up and returns its new
    /// frequency.
    pub(crate) fn bump<K, V>(&mut self, slab: &mut Slab<Entry<K, V>>, id: SlotId) -> Option<u64> {
        let frequency = slab.get(id)?.frequency;
        let bucket = self.buckets.get_mut(&frequency)?;
        if !bucket.list.unlink(slab, id) {
            return None;
        }
        self.len -= 1;

        let prev = if bucket.list.is_empty() {
            let prev = bucket.prev;
            self.unlink_bucket(frequency);
            prev
        } else {
            Some(frequency)
        };
        let next = frequency + 1;
        self.push(slab, id, next, prev).then_some(next)
    }

    /// Detaches and returns the eviction victim: the front of the lowest
    /// non-empty bucket.
    pub(crate) fn pop_minimum<K, V>(&mut self, slab: &mut Slab<Entry<K, V>>) -> Option<SlotId> {
        let min = self.min_frequency?;
        let victim = self.buckets.get(&min)?.list.front()?;
        self.remove(slab, victim).then_some(victim)
    }

    /// Entries in eviction order: lowest frequency first, FIFO within a bucket.
    pub(crate) fn iter<'a, K, V>(
        &'a self,
        slab: &'a Slab<Entry<K, V>>,
    ) -> impl Iterator<Item = (SlotId, &'a Entry<K, V>)> + 'a {
        core::iter::successors(self.min_frequency, move |f| {
            self.buckets.get(f).and_then(|bucket| bucket.next)
        })
        .filter_map(move |f| self.buckets.get(&f))
        .flat_map(move |bucket| bucket.list.iter(slab))
    }

    pub(crate) fn clear(&mut self) {
        self.buckets.clear();
        self.min_frequency = None;
        self.max_frequency = None;
        self.len = 0;
    }

    /// Appends `id` to the bucket for `frequency`, creating the bucket right
    /// after `prev` when it does not exist yet.
    fn push<K, V>(
        &mut self,
        slab: &mut Slab<Entry<K, V>>,
        id: SlotId,
        frequency: u64,
        prev: Option<u64>,
    ) -> bool {
        match slab.get_mut(id) {
            Some(entry) => entry.frequency = frequency,
            None => return false,
        }
        if !self.buckets.contains_key(&frequency) {
            self.link_bucket(frequency, prev);
        }
        let pushed = self
            .buckets
            .get_mut(&frequency)
            .map_or(false, |bucket| bucket.list.push_back(slab, id));
        if pushed {
            self.len += 1;
        }
        pushed
    }

    /// Highest live frequency below `frequency`.
    fn predecessor(&self, frequency: u64) -> Option<u64> {
        if self.min_frequency.map_or(true, |min| frequency < min) {
            return None;
        }
        let mut cursor = self.max_frequency;
        while let Some(f) = cursor {
            if f < frequency {
                return Some(f);
            }
            cursor = self.buckets.get(&f).and_then(|bucket| bucket.prev);
        }
        None
    }

    fn link_bucket(&mut self, frequency: u64, prev: Option<u64>) {
        let next = match prev {
            Some(p) => self.buckets.get(&p).and_then(|bucket| bucket.next),
            None => self.min_frequency,
        };
        match prev.and_then(|p| self.buckets.get_mut(&p)) {
            Some(bucket) => bucket.next = Some(frequency),
            None => self.min_frequency = Some(frequency),
        }
        match next.and_then(|n| self.buckets.get_mut(&n)) {
            Some(bucket) => bucket.prev = Some(frequency),
            None => self.max_frequency = Some(frequency),
        }
        self.buckets.insert(
            frequency,
            Bucket {
                list: List::new(),
                prev,
                next,
            },
        );
    }

    fn unlink_bucket(&mut self, frequency: u64) {
        let Some(bucket) = self.buckets.remove(&frequency) else {
            return;
        };
        match bucket.prev.and_then(|p| self.buckets.get_mut(&p)) {
            Some(prev) => prev.next = bucket.next,
            None => self.min_frequency = bucket.next,
        }
        match bucket.next.and_then(|n| self.buckets.get_mut(&n)) {
            Some(next) => next.prev = bucket.prev,
            None => self.max_frequency = bucket.prev,
        }
    }
}
