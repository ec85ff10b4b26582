//! Pinned LFU Cache Metrics
//!
//! Adds the pinning and capacity-adjustment counters to [`CoreCacheMetrics`].

extern crate alloc;

use super::{CacheMetrics, CoreCacheMetrics};
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

/// Metrics of a [`PinnedLfuCache`](crate::PinnedLfuCache).
#[derive(Debug, Default, Clone)]
pub struct PinnedLfuMetrics {
    /// Core metrics common to all caches
    pub core: CoreCacheMetrics,

    /// Admissions refused because every resident entry was pinned
    pub admissions_denied: u64,

    /// Forced removals refused because the entry was pinned
    pub removals_denied: u64,

    /// Pins taken through `insert` or `lookup`
    pub pins: u64,

    /// Pins returned through `release`
    pub releases: u64,

    /// Forced admissions through `install`
    pub installs: u64,

    /// Forced removals through `erase`
    pub erasures: u64,

    /// Over-releases and stale-handle calls that were ignored
    pub misuse_ignored: u64,

    /// Highest frequency any entry has reached
    pub max_frequency: u64,

    /// Number of unpinned entries at the last update
    pub unpinned_entries: u64,

    /// Number of distinct frequency buckets at the last update
    pub active_frequency_levels: u64,
}

impl PinnedLfuMetrics {
    /// Records a frequency increase to `frequency`.
    pub fn record_frequency(&mut self, frequency: u64) {
        if frequency > self.max_frequency {
            self.max_frequency = frequency;
        }
    }

    /// Updates the ledger gauges.
    pub fn update_ledger(&mut self, unpinned: usize, levels: usize) {
        self.unpinned_entries = unpinned as u64;
        self.active_frequency_levels = levels as u64;
    }

    /// Converts the metrics to a BTreeMap for reporting.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = self.core.to_btreemap();

        metrics.insert(
            "admissions_denied".to_string(),
            self.admissions_denied as f64,
        );
        metrics.insert("removals_denied".to_string(), self.removals_denied as f64);
        metrics.insert("pins".to_string(), self.pins as f64);
        metrics.insert("releases".to_string(), self.releases as f64);
        metrics.insert("installs".to_string(), self.installs as f64);
        metrics.insert("erasures".to_string(), self.erasures as f64);
        metrics.insert("misuse_ignored".to_string(), self.misuse_ignored as f64);
        metrics.insert("max_frequency".to_string(), self.max_frequency as f64);
        metrics.insert(
            "unpinned_entries".to_string(),
            self.unpinned_entries as f64,
        );
        metrics.insert(
            "active_frequency_levels".to_string(),
            self.active_frequency_levels as f64,
        );

        metrics
    }
}

impl CacheMetrics for PinnedLfuMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "PinnedLFU"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_frequency_only_grows() {
        let mut metrics = PinnedLfuMetrics::default();
        metrics.record_frequency(3);
        metrics.record_frequency(2);
        assert_eq!(metrics.max_frequency, 3);
    }

    #[test]
    fn test_btreemap_includes_core_and_pin_counters() {
        let mut metrics = PinnedLfuMetrics::default();
        metrics.core.record_hit();
        metrics.admissions_denied = 2;
        metrics.update_ledger(4, 2);

        let map = metrics.metrics();
        assert_eq!(map["cache_hits"], 1.0);
        assert_eq!(map["admissions_denied"], 2.0);
        assert_eq!(map["unpinned_entries"], 4.0);
        assert_eq!(map["active_frequency_levels"], 2.0);
        assert_eq!(metrics.algorithm_name(), "PinnedLFU");
    }
}
