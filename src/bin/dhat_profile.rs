//! DHAT heap profiler for the cacheplex engines.
//!
//! Run with: cargo run --bin dhat_profile --release --features dhat-heap
//! View results: Open dhat-heap.json in <https://nnethercote.github.io/dh_view/dh_view.html>

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use cacheplex::builder::{CacheBuilder, PolicyKind};
use cacheplex::traits::CachePolicy;

const CAPACITY: usize = 4096;
const OPERATIONS: usize = 100_000;
const UNIVERSE: u64 = 16_384;

/// Simple XorShift64 RNG for deterministic workloads.
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

fn value_for(key: u64) -> String {
    format!("value-{key}")
}

/// 70% of accesses hit 20% of the universe; misses are filled.
fn hotset_workload(cache: &mut dyn CachePolicy<u64, String>, seed: u64) {
    let mut rng = XorShift64::new(seed);
    let hot_size = UNIVERSE / 5;

    for op in 0..OPERATIONS {
        let key = if op % 100 < 70 {
            rng.next_u64() % hot_size
        } else {
            hot_size + rng.next_u64() % (UNIVERSE - hot_size)
        };

        if cache.get(&key).is_none() {
            cache.put(key, value_for(key));
        }
    }
}

/// Sequential passes over the whole universe.
fn scan_workload(cache: &mut dyn CachePolicy<u64, String>) {
    for i in 0..OPERATIONS / 2 {
        let key = (i as u64) % UNIVERSE;
        if cache.get(&key).is_none() {
            cache.put(key, value_for(key));
        }
    }
}

/// Puts of never-seen keys, one eviction each.
fn eviction_churn(cache: &mut dyn CachePolicy<u64, String>) {
    for i in 0..OPERATIONS / 4 {
        let key = UNIVERSE + i as u64;
        cache.put(key, value_for(key));
    }
}

fn profile(kind: PolicyKind) {
    println!("=== Profiling {kind} ===");

    let mut cache = CacheBuilder::new(CAPACITY).build::<u64, String>(kind);

    for i in 0..CAPACITY as u64 {
        cache.put(i, value_for(i));
    }

    hotset_workload(&mut cache, 42);
    scan_workload(&mut cache);
    eviction_churn(&mut cache);

    println!("  Final size: {}", cache.len());
    if let Err(err) = cache.check_invariants() {
        eprintln!("  invariant violation: {err}");
    }
}

fn main() {
    let _profiler = dhat::Profiler::new_heap();

    println!("cacheplex DHAT Heap Profiling");
    println!("=============================\n");

    for kind in PolicyKind::ALL {
        profile(kind);
    }

    println!("\n=============================");
    println!("Profiling complete!");
    println!(
        "View results: Open dhat-heap.json in <https://nnethercote.github.io/dh_view/dh_view.html>"
    );
}
