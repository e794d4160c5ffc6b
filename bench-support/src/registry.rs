//! Central registry for benchmark policies and workloads.
//!
//! Benches and hit-ratio tests iterate over these lists, so adding a policy
//! or scenario here picks it up everywhere.

use crate::operation::OpWorkload;
use crate::workload::{Workload, WorkloadSpec};

/// Executes monomorphic code for each policy.
///
/// Avoids dynamic dispatch in bench hot paths while keeping policy
/// iteration centralized.
///
/// ```ignore
/// for_each_policy! {
///     with |policy_id, display_name, make_cache| {
///         let mut cache = make_cache(CAPACITY);
///         // ...
///     }
/// }
/// ```
///
/// Each block binds `policy_id` (`&str`), `display_name` (`&str`) and
/// `make_cache`, a closure building a `u64 -> u64` cache from a capacity.
#[macro_export]
macro_rules! for_each_policy {
    (with |$policy_id:ident, $display_name:ident, $make_cache:ident| $body:block) => {{
        use cacheplex::policy::{ArcCache, LfuCache, LruCache};

        {
            let $policy_id = "lru";
            let $display_name = "LRU";
            let $make_cache = |cap: usize| LruCache::<u64, u64>::new(cap);
            $body
        }
        {
            let $policy_id = "lfu";
            let $display_name = "LFU";
            let $make_cache = |cap: usize| LfuCache::<u64, u64>::new(cap);
            $body
        }
        {
            let $policy_id = "arc";
            let $display_name = "ARC";
            let $make_cache = |cap: usize| ArcCache::<u64, u64>::new(cap);
            $body
        }
    }};
}

/// Workload case with metadata.
#[derive(Debug, Clone, Copy)]
pub struct WorkloadCase {
    /// Short identifier (e.g. "hotset").
    pub id: &'static str,
    pub display_name: &'static str,
    pub workload: Workload,
    /// How keys turn into `get`/`put` calls.
    pub ops: OpWorkload,
    /// Measured operations.
    pub operations: usize,
    pub capacity: usize,
}

/// Hot keys, loop scan and shifting workloads at their usual sizes.
pub const STANDARD_WORKLOADS: &[WorkloadCase] = &[
    WorkloadCase {
        id: "hotset",
        display_name: "Hot Set 70/30",
        workload: Workload::HotSet {
            hot_keys: 20,
            cold_keys: 5000,
            hot_percent: 70,
        },
        ops: OpWorkload::ReadThrough { admit_prob: 1.0 },
        operations: 100_000,
        capacity: 50,
    },
    WorkloadCase {
        id: "loop_scan",
        display_name: "Loop Scan",
        workload: Workload::LoopScan {
            loop_size: 500,
            sequential_percent: 60,
            random_percent: 30,
        },
        ops: OpWorkload::ReadOnly,
        operations: 100_000,
        capacity: 50,
    },
    WorkloadCase {
        id: "workload_shift",
        display_name: "Workload Shift",
        workload: Workload::WorkloadShift {
            initial_keys: 1000,
            phases: 5,
            operations: 50_000,
        },
        ops: OpWorkload::GetThenMaybePut { put_prob: 0.3 },
        operations: 50_000,
        capacity: 4,
    },
];

impl WorkloadCase {
    pub fn with_seed(self, seed: u64) -> WorkloadSpec {
        WorkloadSpec {
            workload: self.workload,
            seed,
        }
    }
}
