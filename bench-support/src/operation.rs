//! Operation semantics for workload runs.
//!
//! Separates key selection from cache API behavior so the same key stream
//! can drive read-only, read-through and get-then-maybe-put access.

use cacheplex::traits::CachePolicy;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::workload::WorkloadGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get { key: u64 },
    Put { key: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpOutcome {
    Hit,
    Miss,
}

pub trait OpModel {
    fn next_op(&mut self, key: u64) -> Operation;

    fn on_result(&mut self, _key: u64, _outcome: OpOutcome) -> Option<Operation> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpWorkload {
    /// Lookups only; the cache keeps whatever the prefill left in it.
    ReadOnly,
    /// Look up, and `put` on a miss with probability `admit_prob`.
    ReadThrough { admit_prob: f64 },
    /// Look up, then `put` with probability `put_prob` whatever the outcome.
    GetThenMaybePut { put_prob: f64 },
}

impl OpWorkload {
    pub fn build(self, seed: u64) -> Box<dyn OpModel> {
        match self {
            OpWorkload::ReadOnly => Box::new(ReadOnly),
            OpWorkload::ReadThrough { admit_prob } => Box::new(ReadThrough::new(admit_prob, seed)),
            OpWorkload::GetThenMaybePut { put_prob } => {
                Box::new(GetThenMaybePut::new(put_prob, seed))
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpCounts {
    pub gets: u64,
    pub hits: u64,
    pub misses: u64,
    pub puts: u64,
}

impl OpCounts {
    pub fn hit_rate(self) -> f64 {
        if self.gets == 0 {
            0.0
        } else {
            self.hits as f64 / self.gets as f64
        }
    }
}

/// `put`s every prefill key of the generator's workload.
pub fn prefill<C, V, F>(cache: &mut C, generator: &WorkloadGenerator, value_for_key: F)
where
    C: CachePolicy<u64, V> + ?Sized,
    F: Fn(u64) -> V,
{
    for key in generator.workload().prefill_keys() {
        cache.put(key, value_for_key(key));
    }
}

/// Drives `operations` keys from `generator` through `op_model`.
pub fn run_operations<C, V, F, M>(
    cache: &mut C,
    generator: &mut WorkloadGenerator,
    operations: usize,
    op_model: &mut M,
    value_for_key: F,
) -> OpCounts
where
    C: CachePolicy<u64, V> + ?Sized,
    F: Fn(u64) -> V,
    M: OpModel + ?Sized,
{
    let mut counts = OpCounts::default();

    for _ in 0..operations {
        let key = generator.next_key();
        let op = op_model.next_op(key);
        apply_op(cache, generator, op_model, &value_for_key, &mut counts, op);
    }

    counts
}

fn apply_op<C, V, F, M>(
    cache: &mut C,
    generator: &mut WorkloadGenerator,
    op_model: &mut M,
    value_for_key: &F,
    counts: &mut OpCounts,
    op: Operation,
) where
    C: CachePolicy<u64, V> + ?Sized,
    F: Fn(u64) -> V,
    M: OpModel + ?Sized,
{
    match op {
        Operation::Get { key } => {
            counts.gets += 1;
            let outcome = if cache.get(&key).is_some() {
                counts.hits += 1;
                OpOutcome::Hit
            } else {
                counts.misses += 1;
                OpOutcome::Miss
            };

            if let Some(followup) = op_model.on_result(key, outcome) {
                apply_op(cache, generator, op_model, value_for_key, counts, followup);
            }
        },
        Operation::Put { key } => {
            counts.puts += 1;
            cache.put(key, value_for_key(key));
            generator.record_insert();
        },
    }
}

/// Read-only lookups.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOnly;

impl OpModel for ReadOnly {
    fn next_op(&mut self, key: u64) -> Operation {
        Operation::Get { key }
    }
}

/// Read-through: insert on miss with an optional admission rate.
#[derive(Debug, Clone)]
pub struct ReadThrough {
    admit_prob: f64,
    rng: SmallRng,
}

impl ReadThrough {
    pub fn new(admit_prob: f64, seed: u64) -> Self {
        Self {
            admit_prob: admit_prob.clamp(0.0, 1.0),
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl OpModel for ReadThrough {
    fn next_op(&mut self, key: u64) -> Operation {
        Operation::Get { key }
    }

    fn on_result(&mut self, key: u64, outcome: OpOutcome) -> Option<Operation> {
        match outcome {
            OpOutcome::Hit => None,
            OpOutcome::Miss => {
                if self.rng.random::<f64>() < self.admit_prob {
                    Some(Operation::Put { key })
                } else {
                    None
                }
            },
        }
    }
}

/// Lookup followed by a random refresh of the same key.
#[derive(Debug, Clone)]
pub struct GetThenMaybePut {
    put_prob: f64,
    rng: SmallRng,
}

impl GetThenMaybePut {
    pub fn new(put_prob: f64, seed: u64) -> Self {
        Self {
            put_prob: put_prob.clamp(0.0, 1.0),
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl OpModel for GetThenMaybePut {
    fn next_op(&mut self, key: u64) -> Operation {
        Operation::Get { key }
    }

    fn on_result(&mut self, key: u64, _outcome: OpOutcome) -> Option<Operation> {
        if self.rng.random::<f64>() < self.put_prob {
            Some(Operation::Put { key })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use cacheplex::policy::LruCache;

    use super::*;
    use crate::workload::{Workload, WorkloadSpec};

    #[test]
    fn read_through_fills_cache() {
        let mut cache = LruCache::new(100);
        let mut generator = WorkloadSpec {
            workload: Workload::Uniform { universe: 50 },
            seed: 1,
        }
        .generator();
        let mut model = ReadThrough::new(1.0, 1);
        let counts = run_operations(&mut cache, &mut generator, 1000, &mut model, |k| k);

        assert_eq!(counts.gets, 1000);
        assert_eq!(counts.hits + counts.misses, 1000);
        assert_eq!(counts.puts, counts.misses);
        assert_eq!(generator.inserts(), counts.puts);
        // 50 distinct keys fit, so only first touches miss.
        assert!(counts.misses <= 50);
    }

    #[test]
    fn read_only_after_prefill() {
        let mut cache = LruCache::new(600);
        let mut generator = WorkloadSpec {
            workload: Workload::LoopScan {
                loop_size: 500,
                sequential_percent: 100,
                random_percent: 0,
            },
            seed: 2,
        }
        .generator();
        prefill(&mut cache, &generator, |k| k);
        let counts = run_operations(&mut cache, &mut generator, 500, &mut ReadOnly, |k| k);
        assert_eq!(counts.hits, 500);
        assert_eq!(counts.puts, 0);
        assert!((counts.hit_rate() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn boxed_models_drive_trait_objects() {
        let mut cache: Box<dyn CachePolicy<u64, u64>> = Box::new(LruCache::new(10));
        let mut generator = WorkloadSpec {
            workload: Workload::Uniform { universe: 5 },
            seed: 3,
        }
        .generator();
        let mut model = OpWorkload::GetThenMaybePut { put_prob: 1.0 }.build(3);
        let counts = run_operations(cache.as_mut(), &mut generator, 100, model.as_mut(), |k| k);
        assert_eq!(counts.puts, 100);
        assert!(counts.hits >= 95);
    }
}
