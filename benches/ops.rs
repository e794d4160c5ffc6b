//! Micro-operation benchmarks for the three engines.
//!
//! Run with: `cargo bench --bench ops`
//!
//! Measures per-operation latency for get hits, put with eviction and a
//! mixed get/put loop, under identical conditions for every policy.

use std::hint::black_box;
use std::time::Instant;

use bench_support::for_each_policy;
use cacheplex::builder::{CacheBuilder, PolicyKind};
use cacheplex::traits::CachePolicy;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

const CAPACITY: usize = 16_384;
const OPS: u64 = 100_000;

// ============================================================================
// Get Hit Latency (ns/op)
// ============================================================================

fn bench_get_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_hit_ns");
    group.throughput(Throughput::Elements(OPS));

    for_each_policy! {
        with |policy_id, _display_name, make_cache| {
            group.bench_function(policy_id, |b| {
                b.iter_custom(|iters| {
                    let mut cache = make_cache(CAPACITY);
                    for i in 0..CAPACITY as u64 {
                        cache.put(i, i);
                    }
                    let start = Instant::now();
                    for _ in 0..iters {
                        for i in 0..OPS {
                            let key = i % (CAPACITY as u64);
                            black_box(cache.get(&key));
                        }
                    }
                    start.elapsed()
                })
            });
        }
    }

    group.finish();
}

// ============================================================================
// Put With Eviction (ns/op)
// ============================================================================

fn bench_put_evict(c: &mut Criterion) {
    let mut group = c.benchmark_group("put_evict_ns");
    group.throughput(Throughput::Elements(OPS));

    for_each_policy! {
        with |policy_id, _display_name, make_cache| {
            group.bench_function(policy_id, |b| {
                b.iter_custom(|iters| {
                    let mut cache = make_cache(CAPACITY);
                    for i in 0..CAPACITY as u64 {
                        cache.put(i, i);
                    }
                    let mut next = CAPACITY as u64;
                    let start = Instant::now();
                    for _ in 0..iters {
                        for _ in 0..OPS {
                            black_box(cache.put(next, next));
                            next += 1;
                        }
                    }
                    start.elapsed()
                })
            });
        }
    }

    group.finish();
}

// ============================================================================
// Mixed Get/Put Through The Runtime Wrapper (ns/op)
// ============================================================================

fn bench_mixed_dyn(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed_dyn_ns");
    group.throughput(Throughput::Elements(OPS));

    for kind in PolicyKind::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(kind), &kind, |b, &kind| {
            b.iter_custom(|iters| {
                let mut cache = CacheBuilder::new(CAPACITY).build::<u64, u64>(kind);
                let universe = (CAPACITY * 2) as u64;
                let start = Instant::now();
                for _ in 0..iters {
                    for i in 0..OPS {
                        // 3:1 get/put over twice the capacity
                        let key = i.wrapping_mul(0x9E37_79B9_7F4A_7C15) % universe;
                        if i % 4 == 0 {
                            black_box(cache.put(key, i));
                        } else {
                            black_box(cache.get(&key));
                        }
                    }
                }
                start.elapsed()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_get_hit, bench_put_evict, bench_mixed_dyn);
criterion_main!(benches);
