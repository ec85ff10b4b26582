//! Concurrent Cache Benchmarks
//!
//! Pin/release throughput of the sharded cache across segment counts.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pincache::ConcurrentPinnedLfuCache;
use std::sync::Arc;
use std::thread;

const CACHE_SIZE: usize = 10_000;
const OPS_PER_THREAD: usize = 1_000;
const THREADS: usize = 8;

fn make_cache(segments: usize) -> Arc<ConcurrentPinnedLfuCache<usize, usize>> {
    let cache = ConcurrentPinnedLfuCache::with_segments(CACHE_SIZE, segments).unwrap();
    for i in 0..CACHE_SIZE {
        cache.insert(i, false);
    }
    Arc::new(cache)
}

fn run_pin_release(cache: Arc<ConcurrentPinnedLfuCache<usize, usize>>, miss_every: usize) {
    let mut handles = Vec::with_capacity(THREADS);
    for t in 0..THREADS {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..OPS_PER_THREAD {
                let mut key = (t * OPS_PER_THREAD + i) % CACHE_SIZE;
                if miss_every > 0 && i % miss_every == 0 {
                    key += CACHE_SIZE * (t + 1);
                }
                if let Some(h) = cache.insert(key, true) {
                    black_box(cache.with_value_mut(h, |v| *v += 1));
                    cache.release(h);
                }
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
}

fn pinned_hits(c: &mut Criterion) {
    let mut group = c.benchmark_group("Concurrent Pinned Hits");
    group.throughput(Throughput::Elements((THREADS * OPS_PER_THREAD) as u64));

    let cache = make_cache(16);
    group.bench_function("pin/release", |b| {
        b.iter(|| run_pin_release(Arc::clone(&cache), 0));
    });
    group.finish();
}

fn mixed_admission(c: &mut Criterion) {
    let mut group = c.benchmark_group("Concurrent Mixed Admission");
    group.throughput(Throughput::Elements((THREADS * OPS_PER_THREAD) as u64));

    let cache = make_cache(16);
    group.bench_function("20% misses", |b| {
        b.iter(|| run_pin_release(Arc::clone(&cache), 5));
    });
    group.finish();
}

fn segment_count_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("Segment Count");
    group.throughput(Throughput::Elements((THREADS * OPS_PER_THREAD) as u64));

    for segments in [1usize, 4, 16, 64] {
        let cache = make_cache(segments);
        group.bench_with_input(BenchmarkId::from_parameter(segments), &segments, |b, _| {
            b.iter(|| run_pin_release(Arc::clone(&cache), 5));
        });
    }
    group.finish();
}

criterion_group!(benches, pinned_hits, mixed_admission, segment_count_comparison);
criterion_main!(benches);
