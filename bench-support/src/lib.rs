//! Benchmark support utilities for cacheplex.
//!
//! Deterministic key streams (hot set, loop scan, workload shift), the
//! operation models that turn keys into `get`/`put` calls, and the registry
//! of policies and workloads shared by benches and hit-ratio tests.

pub mod operation;
pub mod registry;
pub mod workload;

// for_each_policy! is exported at the crate root via #[macro_export]
