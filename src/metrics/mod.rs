//! Cache Metrics System
//!
//! Counters kept by the cache engine and reported through the
//! [`CacheMetrics`] trait as a `BTreeMap<String, f64>`.
//!
//! BTreeMap is used so metrics always come out in the same order, which keeps
//! test assertions and diffed dumps stable.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

pub mod lfu;

pub use lfu::PinnedLfuMetrics;

/// Counters common to every cache.
#[derive(Debug, Default, Clone)]
pub struct CoreCacheMetrics {
    /// Total number of accesses by key (`insert` and `lookup`)
    pub requests: u64,

    /// Accesses that found the key resident
    pub cache_hits: u64,

    /// Entries created, by admission or by `install`
    pub insertions: u64,

    /// Entries destroyed to make room for a new admission
    pub evictions: u64,
}

impl CoreCacheMetrics {
    /// Records an access that found the key resident.
    pub fn record_hit(&mut self) {
        self.requests += 1;
        self.cache_hits += 1;
    }

    /// Records an access that did not find the key.
    pub fn record_miss(&mut self) {
        self.requests += 1;
    }

    /// Records a newly admitted entry.
    pub fn record_insertion(&mut self) {
        self.insertions += 1;
    }

    /// Records an entry evicted to make room.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Fraction of requests that hit, or 0.0 before the first request.
    pub fn hit_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_hits as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Fraction of requests that missed, or 0.0 before the first request.
    pub fn miss_rate(&self) -> f64 {
        if self.requests > 0 {
            (self.requests - self.cache_hits) as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Converts the core counters to a BTreeMap for reporting.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        metrics.insert("cache_hits".to_string(), self.cache_hits as f64);
        metrics.insert(
            "cache_misses".to_string(),
            (self.requests - self.cache_hits) as f64,
        );
        metrics.insert("evictions".to_string(), self.evictions as f64);
        metrics.insert("insertions".to_string(), self.insertions as f64);
        metrics.insert("requests".to_string(), self.requests as f64);

        metrics.insert("hit_rate".to_string(), self.hit_rate());
        metrics.insert("miss_rate".to_string(), self.miss_rate());

        if self.requests > 0 {
            metrics.insert(
                "eviction_rate".to_string(),
                self.evictions as f64 / self.requests as f64,
            );
        }

        metrics
    }
}

/// Uniform metrics reporting for every cache type in the crate.
pub trait CacheMetrics {
    /// Returns all metrics as key-value pairs in deterministic order.
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Algorithm name for identification
    fn algorithm_name(&self) -> &'static str;
}

/// Merges the metric maps of several engines into one report.
///
/// Counters are summed, `max_frequency` keeps the largest value, and the
/// rates are recomputed from the summed counters.
pub(crate) fn aggregate<I>(parts: I) -> BTreeMap<String, f64>
where
    I: IntoIterator<Item = BTreeMap<String, f64>>,
{
    let mut aggregated: BTreeMap<String, f64> = BTreeMap::new();
    for part in parts {
        for (key, value) in part {
            let slot = aggregated.entry(key.clone()).or_insert(0.0);
            if key == "max_frequency" {
                *slot = slot.max(value);
            } else {
                *slot += value;
            }
        }
    }

    let requests = aggregated.get("requests").copied().unwrap_or(0.0);
    aggregated.remove("eviction_rate");
    if requests > 0.0 {
        let hits = aggregated.get("cache_hits").copied().unwrap_or(0.0);
        let evictions = aggregated.get("evictions").copied().unwrap_or(0.0);
        aggregated.insert("hit_rate".to_string(), hits / requests);
        aggregated.insert("miss_rate".to_string(), (requests - hits) / requests);
        aggregated.insert("eviction_rate".to_string(), evictions / requests);
    } else {
        aggregated.insert("hit_rate".to_string(), 0.0);
        aggregated.insert("miss_rate".to_string(), 0.0);
    }
    aggregated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates() {
        let mut core = CoreCacheMetrics::default();
        assert_eq!(core.hit_rate(), 0.0);
        assert_eq!(core.miss_rate(), 0.0);

        core.record_hit();
        core.record_hit();
        core.record_hit();
        core.record_miss();
        assert_eq!(core.hit_rate(), 0.75);
        assert_eq!(core.miss_rate(), 0.25);
    }

    #[test]
    fn test_btreemap_keys() {
        let mut core = CoreCacheMetrics::default();
        core.record_miss();
        core.record_insertion();
        core.record_eviction();

        let map = core.to_btreemap();
        assert_eq!(map["requests"], 1.0);
        assert_eq!(map["cache_misses"], 1.0);
        assert_eq!(map["insertions"], 1.0);
        assert_eq!(map["evictions"], 1.0);
        assert_eq!(map["eviction_rate"], 1.0);
    }

    #[test]
    fn test_aggregate_recomputes_rates() {
        let mut a = CoreCacheMetrics::default();
        a.record_hit();
        a.record_miss();
        let mut b = CoreCacheMetrics::default();
        b.record_hit();
        b.record_hit();

        let mut first = a.to_btreemap();
        first.insert("max_frequency".to_string(), 7.0);
        let mut second = b.to_btreemap();
        second.insert("max_frequency".to_string(), 3.0);

        let merged = aggregate([first, second]);
        assert_eq!(merged["requests"], 4.0);
        assert_eq!(merged["cache_hits"], 3.0);
        assert_eq!(merged["hit_rate"], 0.75);
        assert_eq!(merged["eviction_rate"], 0.0);
        assert_eq!(merged["max_frequency"], 7.0);
    }
}
