#![no_std]
extern crate alloc;
extern crate pincache;

use alloc::string::String;
use alloc::vec::Vec;
use pincache::config::PinnedLfuConfig;
use pincache::hash::XxState;
use pincache::PinnedLfuCache;

fn make_cache<K: core::hash::Hash + Eq + Clone, V: Default>(cap: usize) -> PinnedLfuCache<K, V> {
    let config = PinnedLfuConfig { capacity: cap };
    PinnedLfuCache::init(config, None).unwrap()
}

#[test]
fn test_pinned_lfu_in_no_std() {
    let mut cache: PinnedLfuCache<String, Vec<u8>> = make_cache(2);

    // String keys and Vec values both need the alloc crate
    let key1 = String::from("key1");
    let key2 = String::from("key2");
    let key3 = String::from("key3");

    let h1 = cache.insert(key1.clone(), true).unwrap();
    cache.value_mut(h1).unwrap().extend_from_slice(b"page one");
    cache.insert(key2.clone(), false).unwrap();

    // key1 is pinned, so key2 goes
    cache.insert(key3.clone(), false).unwrap();
    assert!(cache.contains(&key1));
    assert!(!cache.contains(&key2));
    assert!(cache.contains(&key3));
    assert_eq!(cache.value(h1).map(Vec::as_slice), Some(&b"page one"[..]));

    assert!(cache.release(h1));
}

#[test]
fn test_checkpoint_in_no_std() {
    let mut cache: PinnedLfuCache<u32, u32, XxState> =
        PinnedLfuCache::init(PinnedLfuConfig { capacity: 4 }, None).unwrap();
    for key in 0..4 {
        let h = cache.insert(key, true).unwrap();
        *cache.value_mut(h).unwrap() = key + 10;
        cache.release(h);
    }

    let snapshot = cache.checkpoint();
    assert_eq!(snapshot.len(), 4);
    assert_eq!(snapshot[0], (0, 10));

    let recovered: PinnedLfuCache<u32, u32, XxState> =
        PinnedLfuCache::recover(PinnedLfuConfig { capacity: 4 }, None, snapshot).unwrap();
    assert_eq!(recovered.len(), 4);
}
