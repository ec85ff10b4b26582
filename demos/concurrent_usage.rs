//! Concurrent Cache Usage Examples
//!
//! Multi-threaded usage of the sharded pinned LFU cache as a small buffer pool.
//!
//! Run with: cargo run --example concurrent_usage --features concurrent

extern crate pincache;

use pincache::config::{ConcurrentCacheConfig, ConcurrentPinnedLfuConfig, PinnedLfuConfig};
use pincache::hash::MurmurState;
use pincache::metrics::CacheMetrics;
use pincache::ConcurrentPinnedLfuCache;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

const BLOCK_SIZE: usize = 4096;

fn pool_config(capacity: usize, segments: usize) -> ConcurrentPinnedLfuConfig {
    ConcurrentCacheConfig {
        base: PinnedLfuConfig { capacity },
        segments,
    }
}

fn main() {
    println!("Concurrent Pinned LFU Usage Examples");
    println!("====================================\n");

    buffer_pool_readers();
    println!();
    pinned_working_set();
    println!();
    segment_tuning();
}

/// Several readers share one pool: pin, read or fill, release.
fn buffer_pool_readers() {
    println!("1. Buffer Pool Readers");
    println!("   -------------------");

    let pool: Arc<ConcurrentPinnedLfuCache<u64, Vec<u8>, MurmurState>> =
        Arc::new(ConcurrentPinnedLfuCache::init(pool_config(256, 16), None).unwrap());

    let start = Instant::now();
    let readers: Vec<_> = (0..4u64)
        .map(|t| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                let mut loads = 0usize;
                for i in 0..2_000u64 {
                    // Skewed access: low block numbers are hot.
                    let block = (i * (t + 1)) % 64 + (i % 7) * 64;
                    let Some(h) = pool.insert(block, true) else {
                        continue;
                    };
                    let loaded = pool
                        .with_value_mut(h, |page| {
                            if page.is_empty() {
                                page.resize(BLOCK_SIZE, block as u8);
                                true
                            } else {
                                false
                            }
                        })
                        .unwrap_or(false);
                    loads += usize::from(loaded);
                    pool.release(h);
                }
                loads
            })
        })
        .collect();

    let loads: usize = readers.into_iter().map(|r| r.join().unwrap()).sum();
    let metrics = pool.metrics();
    println!("   Block loads: {}", loads);
    println!(
        "   Hit rate: {:.1}% over {} requests in {:?}",
        metrics["hit_rate"] * 100.0,
        metrics["requests"],
        start.elapsed()
    );
    println!("   Resident blocks: {} / {}", pool.len(), pool.capacity());
}

/// Pinned blocks stay resident while other threads churn the pool.
fn pinned_working_set() {
    println!("2. Pinned Working Set");
    println!("   ------------------");

    let pool: Arc<ConcurrentPinnedLfuCache<u64, u64>> =
        Arc::new(ConcurrentPinnedLfuCache::with_segments(64, 4).unwrap());
    let superblocks: Vec<_> = (0..4u64)
        .map(|b| pool.insert(b, true).unwrap())
        .collect();

    let churners: Vec<_> = (0..4u64)
        .map(|t| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                for i in 0..5_000u64 {
                    pool.insert(1_000 + t * 10_000 + i, false);
                }
            })
        })
        .collect();
    for churner in churners {
        churner.join().unwrap();
    }

    let still_resident = (0..4u64).filter(|b| pool.contains(b)).count();
    println!("   Superblocks still resident: {} / 4", still_resident);
    for h in superblocks {
        pool.release(h);
    }
    println!("   Evictions: {}", pool.metrics()["evictions"]);
}

fn segment_tuning() {
    println!("3. Segment Count Tuning");
    println!("   ---------------------");

    for segments in [1usize, 4, 16] {
        let pool: Arc<ConcurrentPinnedLfuCache<u64, u64>> =
            Arc::new(ConcurrentPinnedLfuCache::with_segments(4_096, segments).unwrap());
        let start = Instant::now();
        let workers: Vec<_> = (0..8u64)
            .map(|t| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    for i in 0..10_000u64 {
                        if let Some(h) = pool.insert((t * 31 + i) % 8_192, true) {
                            pool.release(h);
                        }
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        println!("   {:>2} segments: {:?}", segments, start.elapsed());
    }

    println!();
    println!("   Capacity, eviction and pinning are per segment: a segment whose");
    println!("   entries are all pinned denies admission even if others have room.");
}
