//! Correctness Tests for the Pinned LFU Cache
//!
//! Validates eviction order, pin safety and the erase/install capacity rules
//! with small caches and deterministic access patterns.
//!
//! ## Test Strategy
//! - Small capacities (1-4 entries) so every eviction is predictable
//! - Eviction order observed through `for_each_lfu`
//! - Pinned working set observed through `for_each` minus `for_each_lfu`

use pincache::config::PinnedLfuConfig;
use pincache::hash::{CrcState, IdentityState, MurmurState, XxState};
use pincache::metrics::CacheMetrics;
use pincache::{Handle, PinnedLfuCache};
use std::collections::BTreeMap;

type BlockCache = PinnedLfuCache<u32, u32>;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn make_cache(capacity: usize) -> BlockCache {
    PinnedLfuCache::init(PinnedLfuConfig { capacity }, None).unwrap()
}

/// Keys in eviction order.
fn lfu_order<S: std::hash::BuildHasher>(cache: &PinnedLfuCache<u32, u32, S>) -> Vec<u32> {
    let mut keys = Vec::new();
    cache.for_each_lfu(|k, _| keys.push(*k));
    keys
}

/// Pinned keys, sorted.
fn in_use<S: std::hash::BuildHasher>(cache: &PinnedLfuCache<u32, u32, S>) -> Vec<u32> {
    let unpinned = lfu_order(cache);
    let mut keys = Vec::new();
    cache.for_each(|k, _| {
        if !unpinned.contains(k) {
            keys.push(*k);
        }
    });
    keys.sort_unstable();
    keys
}

fn contents<S: std::hash::BuildHasher>(cache: &PinnedLfuCache<u32, u32, S>) -> BTreeMap<u32, u32> {
    let mut map = BTreeMap::new();
    cache.for_each(|k, v| {
        map.insert(*k, *v);
    });
    map
}

fn set(cache: &mut BlockCache, handle: Handle, value: u32) {
    *cache.value_mut(handle).unwrap() = value;
}

fn freq(cache: &BlockCache, key: u32) -> u64 {
    let handle = cache.peek(&key).unwrap();
    cache.frequency(handle).unwrap()
}

// ============================================================================
// EVICTION ORDER
// ============================================================================

#[test]
fn test_release_order_is_eviction_order() {
    let mut cache = make_cache(3);
    let a = cache.insert(1, true).unwrap();
    let b = cache.insert(2, true).unwrap();
    let c = cache.insert(3, true).unwrap();
    cache.release(a);
    cache.release(b);
    cache.release(c);

    cache.insert(10, true).unwrap();
    assert!(!cache.contains(&1));
    cache.insert(11, true).unwrap();
    assert!(!cache.contains(&2));
    cache.insert(12, true).unwrap();
    assert!(!cache.contains(&3));
    assert!(cache.insert(13, true).is_none());
}

#[test]
fn test_ties_break_by_age_within_frequency() {
    let mut cache = make_cache(3);
    cache.insert(1, false);
    cache.insert(2, false);
    cache.insert(3, false);
    assert_eq!(lfu_order(&cache), vec![1, 2, 3]);

    cache.lookup(&1, false);
    cache.lookup(&3, false);
    assert_eq!(lfu_order(&cache), vec![2, 1, 3]);

    cache.insert(4, false);
    assert!(!cache.contains(&2));
    assert_eq!(lfu_order(&cache), vec![4, 1, 3]);
}

#[test]
fn test_pinned_entry_never_evicted() {
    let mut cache = make_cache(2);
    let hot = cache.insert(1, true).unwrap();
    for key in 2..50 {
        cache.insert(key, false).unwrap();
        assert!(cache.contains(&1));
    }
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.pin_count(hot), Some(1));
    assert_eq!(cache.stats().core.evictions, 47);
}

#[test]
fn test_denial_leaves_cache_unchanged() {
    let mut cache = make_cache(2);
    cache.insert(1, true);
    cache.insert(2, true);
    let before = contents(&cache);

    assert!(cache.insert(3, false).is_none());
    assert_eq!(contents(&cache), before);
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.capacity(), 2);
    assert_eq!(freq(&cache, 1), 1);
}

#[test]
fn test_admission_scenario() {
    let mut cache = make_cache(4);
    let _h1 = cache.insert(1, true).unwrap();
    let _h2 = cache.insert(2, true).unwrap();
    let h3 = cache.insert(3, true).unwrap();
    cache.insert(4, false).unwrap();
    cache.lookup(&4, true).unwrap();

    assert!(cache.insert(5, true).is_none());

    cache.release(h3);
    let h5 = cache.insert(5, true).unwrap();
    assert_eq!(cache.len(), 4);
    assert_eq!(cache.capacity(), 4);
    assert!(!cache.contains(&3));
    assert_eq!(cache.pin_count(h5), Some(1));
}

// ============================================================================
// ERASE / INSTALL
// ============================================================================

#[test]
fn test_install_erase_symmetry() {
    let mut cache = make_cache(2);
    cache.insert(1, false);
    cache.insert(2, false);

    let installed = cache.install(3);
    assert_eq!((cache.len(), cache.capacity()), (3, 3));

    assert!(cache.erase(installed));
    assert_eq!((cache.len(), cache.capacity()), (2, 2));
}

#[test]
fn test_erase_pinned_fails_without_side_effects() {
    let mut cache = make_cache(2);
    let h = cache.insert(1, true).unwrap();

    assert!(!cache.erase(h));
    assert_eq!(cache.pin_count(h), Some(1));
    assert_eq!(cache.frequency(h), Some(1));
    assert_eq!(cache.capacity(), 2);

    cache.release(h);
    assert!(cache.erase(h));
    assert_eq!(cache.capacity(), 1);
}

#[test]
fn test_stale_handles_after_eviction() {
    let mut cache = make_cache(1);
    let old = cache.insert(1, false).unwrap();
    let new = cache.insert(2, false).unwrap();

    // Same slot, new generation.
    assert_eq!(old.slot().index(), new.slot().index());
    assert_ne!(old, new);
    assert_eq!(cache.value(old), None);
    assert_eq!(cache.key(new), Some(&2));
    assert!(!cache.release(old));
    assert!(!cache.erase(old));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.stats().misuse_ignored, 2);
}

// ============================================================================
// REFERENCE SCENARIO
// ============================================================================

/// Full walk through pinning, denial, eviction order, erase/install and
/// checkpoint recovery on a four-entry cache.
#[test]
fn test_reference_scenario() {
    let mut cache = make_cache(4);

    let h1 = cache.insert(1, true).unwrap();
    set(&mut cache, h1, 111);
    let h2 = cache.insert(2, true).unwrap();
    set(&mut cache, h2, 222);
    let h3 = cache.insert(3, true).unwrap();
    set(&mut cache, h3, 333);
    let h4 = cache.insert(4, false).unwrap();
    set(&mut cache, h4, 444);
    assert_eq!(lfu_order(&cache), vec![4]);
    assert_eq!(in_use(&cache), vec![1, 2, 3]);

    let h4 = cache.lookup(&4, true).unwrap();
    set(&mut cache, h4, 4444);
    assert!(lfu_order(&cache).is_empty());
    assert!(cache.insert(5, true).is_none());
    assert_eq!(cache.len(), 4);

    cache.release(h3);
    assert_eq!(lfu_order(&cache), vec![3]);
    let h5 = cache.insert(5, true).unwrap();
    set(&mut cache, h5, 555);
    assert_eq!(in_use(&cache), vec![1, 2, 4, 5]);

    cache.release(h5);
    cache.release(h2);
    cache.release(h4);
    assert_eq!(lfu_order(&cache), vec![5, 2, 4]);
    assert_eq!(in_use(&cache), vec![1]);

    let h3 = cache.insert(3, true).unwrap();
    set(&mut cache, h3, 3333);
    assert_eq!(lfu_order(&cache), vec![2, 4]);
    assert_eq!(in_use(&cache), vec![1, 3]);
    assert!(cache.lookup(&5, true).is_none());

    let h5 = cache.insert(5, true).unwrap();
    assert_eq!(in_use(&cache), vec![1, 3, 5]);
    let h6 = cache.insert(6, true).unwrap();
    set(&mut cache, h6, 666);
    assert!(lfu_order(&cache).is_empty());

    let h5_again = cache.insert(5, true).unwrap();
    assert_eq!(h5, h5_again);
    assert_eq!(cache.pin_count(h5), Some(2));
    set(&mut cache, h5_again, 555);
    assert!(cache.insert(7, true).is_none());

    cache.release(h1);
    cache.release(h3);
    cache.release(h5);
    cache.release(h6);
    assert_eq!(lfu_order(&cache), vec![1, 3, 6]);
    assert_eq!(in_use(&cache), vec![5]);

    cache.lookup(&3, false).unwrap();
    assert_eq!(lfu_order(&cache), vec![1, 6, 3]);
    cache.release(h5_again);
    assert_eq!(lfu_order(&cache), vec![1, 6, 3, 5]);
    cache.lookup(&5, false).unwrap();
    assert_eq!(lfu_order(&cache), vec![1, 6, 3, 5]);

    let h6 = cache.lookup(&6, true).unwrap();
    assert_eq!(lfu_order(&cache), vec![1, 3, 5]);
    cache.release(h6);
    assert_eq!(lfu_order(&cache), vec![1, 3, 6, 5]);
    assert_eq!(freq(&cache, 1), 2);
    assert_eq!(freq(&cache, 3), 3);
    assert_eq!(freq(&cache, 6), 4);
    assert_eq!(freq(&cache, 5), 5);

    assert!(cache.lookup(&7, false).is_none());
    let h7 = cache.insert(7, false).unwrap();
    set(&mut cache, h7, 777);
    assert_eq!(lfu_order(&cache), vec![7, 3, 6, 5]);

    assert!(cache.erase(h7));
    assert_eq!((cache.len(), cache.capacity()), (3, 3));
    assert_eq!(lfu_order(&cache), vec![3, 6, 5]);

    let h6 = cache.lookup(&6, true).unwrap();
    assert!(!cache.erase(h6));
    let h8 = cache.insert(8, false).unwrap();
    set(&mut cache, h8, 888);
    assert_eq!(lfu_order(&cache), vec![8, 5]);
    assert_eq!(cache.len(), 3);

    let h9 = cache.install(9);
    set(&mut cache, h9, 999);
    assert_eq!((cache.len(), cache.capacity()), (4, 4));
    assert_eq!(lfu_order(&cache), vec![8, 9, 5]);

    let expected: BTreeMap<u32, u32> = [(5, 555), (6, 666), (8, 888), (9, 999)].into();
    assert_eq!(contents(&cache), expected);

    cache.release(h6);
    assert_eq!(lfu_order(&cache), vec![8, 9, 5, 6]);

    let checkpoint = cache.checkpoint();
    assert_eq!(checkpoint, vec![(8, 888), (9, 999), (5, 555), (6, 666)]);

    let recovered: BlockCache =
        PinnedLfuCache::recover(PinnedLfuConfig { capacity: 4 }, None, checkpoint).unwrap();
    assert_eq!(lfu_order(&recovered), vec![8, 9, 5, 6]);
    assert_eq!(contents(&recovered), expected);
    assert!(in_use(&recovered).is_empty());
}

// ============================================================================
// HASH STRATEGIES
// ============================================================================

fn run_with_hasher<S>(hasher: S)
where
    S: std::hash::BuildHasher + Default,
{
    let mut cache: PinnedLfuCache<u32, u32, S> =
        PinnedLfuCache::init(PinnedLfuConfig { capacity: 3 }, Some(hasher)).unwrap();
    for key in [10, 20, 30] {
        let h = cache.insert(key, true).unwrap();
        *cache.value_mut(h).unwrap() = key + 1;
        cache.release(h);
    }
    cache.lookup(&10, false);
    cache.insert(40, false);

    assert!(!cache.contains(&20));
    assert_eq!(lfu_order(&cache), vec![40, 30, 10]);
    assert_eq!(contents(&cache)[&10], 11);
}

#[test]
fn test_crc_hasher() {
    run_with_hasher(CrcState::default());
}

#[test]
fn test_string_keys_with_crc_hasher() {
    let mut cache: PinnedLfuCache<String, u32, CrcState> =
        PinnedLfuCache::init(PinnedLfuConfig { capacity: 2 }, None).unwrap();
    cache.insert("block-17".to_string(), false);
    cache.insert("block-18".to_string(), false);
    cache.lookup("block-17", false);
    cache.insert("block-19".to_string(), false);

    assert!(cache.contains("block-17"));
    assert!(!cache.contains("block-18"));
    assert!(cache.contains("block-19"));
}

#[test]
fn test_identity_hasher() {
    run_with_hasher(IdentityState::default());
}

#[test]
fn test_murmur_hasher() {
    run_with_hasher(MurmurState::default());
}

#[test]
fn test_xx_hasher() {
    run_with_hasher(XxState::default());
}

// ============================================================================
// METRICS
// ============================================================================

#[test]
fn test_metrics_track_pin_traffic() {
    let mut cache = make_cache(2);
    let a = cache.insert(1, true).unwrap();
    let b = cache.insert(2, true).unwrap();
    cache.insert(3, false);
    cache.release(a);
    cache.release(a);
    cache.erase(b);
    cache.install(4);

    let metrics = cache.metrics();
    assert_eq!(metrics["admissions_denied"], 1.0);
    assert_eq!(metrics["pins"], 2.0);
    assert_eq!(metrics["releases"], 1.0);
    assert_eq!(metrics["misuse_ignored"], 1.0);
    assert_eq!(metrics["removals_denied"], 1.0);
    assert_eq!(metrics["installs"], 1.0);
    assert_eq!(metrics["erasures"], 0.0);
}
