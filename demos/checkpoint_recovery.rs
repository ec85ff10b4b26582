//! Checkpoint and recovery of a block cache's working set.
//!
//! Run with: cargo run --example checkpoint_recovery

extern crate pincache;

use pincache::config::PinnedLfuConfig;
use pincache::hash::XxState;
use pincache::metrics::CacheMetrics;
use pincache::PinnedLfuCache;

type BlockCache = PinnedLfuCache<u32, String, XxState>;

fn main() {
    let config = PinnedLfuConfig { capacity: 6 };
    let mut cache: BlockCache = PinnedLfuCache::init(config, None).unwrap();

    // Warm the cache; blocks 1 and 2 are read repeatedly.
    for block in [1, 2, 3, 4, 5, 1, 2, 1] {
        let h = cache.insert(block, true).unwrap();
        let page = cache.value_mut(h).unwrap();
        if page.is_empty() {
            *page = format!("contents of block {}", block);
        }
        cache.release(h);
    }

    // A writer holds block 6 while the checkpoint runs.
    let writer = cache.insert(6, true).unwrap();
    *cache.value_mut(writer).unwrap() = String::from("dirty block 6");

    println!("Eviction order before checkpoint:");
    cache.for_each_lfu(|block, _| {
        let freq = cache.peek(block).and_then(|h| cache.frequency(h)).unwrap_or(0);
        println!("  block {} (frequency {})", block, freq);
    });

    // Pinned entries are not part of the snapshot.
    let snapshot = cache.checkpoint();
    println!("Checkpointed {} of {} blocks", snapshot.len(), cache.len());
    cache.release(writer);

    let recovered: BlockCache = PinnedLfuCache::recover(config, None, snapshot).unwrap();
    println!("Recovered cache:");
    recovered.for_each_lfu(|block, page| println!("  block {}: {}", block, page));

    for (name, value) in recovered.metrics() {
        println!("  {:<24} {}", name, value);
    }
}
