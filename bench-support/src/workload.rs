//! Seeded key-stream generators.
//!
//! Every generator is a pure function of its [`WorkloadSpec`]: the same seed
//! yields the same key sequence, so hit ratios are comparable across
//! policies and across runs.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Shape of a key stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Workload {
    /// Keys drawn uniformly from `[0, universe)`.
    Uniform { universe: u64 },
    /// `hot_percent` of operations hit `[0, hot_keys)`, the rest hit
    /// `[hot_keys, hot_keys + cold_keys)`.
    HotSet {
        hot_keys: u64,
        cold_keys: u64,
        hot_percent: u64,
    },
    /// Sequential passes over `[0, loop_size)` mixed with random jumps inside
    /// the loop and accesses just outside it.
    LoopScan {
        loop_size: u64,
        sequential_percent: u64,
        random_percent: u64,
    },
    /// `phases` equal-length phases cycling through hot, wide random,
    /// sequential, local random and mixed access over `[0, initial_keys)`.
    WorkloadShift {
        initial_keys: u64,
        phases: u64,
        operations: u64,
    },
}

impl Workload {
    /// Keys to `put` before measuring, if the workload expects a warm cache.
    pub fn prefill_keys(&self) -> std::ops::Range<u64> {
        match *self {
            Workload::LoopScan { loop_size, .. } => 0..loop_size,
            Workload::WorkloadShift { initial_keys, .. } => 0..initial_keys,
            Workload::Uniform { .. } | Workload::HotSet { .. } => 0..0,
        }
    }
}

/// A workload bound to a seed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkloadSpec {
    pub workload: Workload,
    pub seed: u64,
}

impl WorkloadSpec {
    pub fn generator(self) -> WorkloadGenerator {
        WorkloadGenerator::new(self)
    }
}

/// Stateful key generator for one [`WorkloadSpec`].
#[derive(Debug, Clone)]
pub struct WorkloadGenerator {
    workload: Workload,
    rng: SmallRng,
    op: u64,
    loop_pos: u64,
    inserts: u64,
}

impl WorkloadGenerator {
    pub fn new(spec: WorkloadSpec) -> Self {
        Self {
            workload: spec.workload,
            rng: SmallRng::seed_from_u64(spec.seed),
            op: 0,
            loop_pos: 0,
            inserts: 0,
        }
    }

    pub fn workload(&self) -> Workload {
        self.workload
    }

    /// Number of keys handed out so far.
    pub fn position(&self) -> u64 {
        self.op
    }

    /// Number of inserts the driver reported via [`record_insert`](Self::record_insert).
    pub fn inserts(&self) -> u64 {
        self.inserts
    }

    pub fn record_insert(&mut self) {
        self.inserts += 1;
    }

    pub fn next_key(&mut self) -> u64 {
        let op = self.op;
        self.op += 1;
        match self.workload {
            Workload::Uniform { universe } => self.below(universe),
            Workload::HotSet {
                hot_keys,
                cold_keys,
                hot_percent,
            } => {
                if op % 100 < hot_percent {
                    self.below(hot_keys)
                } else {
                    hot_keys + self.below(cold_keys)
                }
            },
            Workload::LoopScan {
                loop_size,
                sequential_percent,
                random_percent,
            } => {
                let r = op % 100;
                if r < sequential_percent {
                    let key = self.loop_pos;
                    self.loop_pos = (self.loop_pos + 1) % loop_size.max(1);
                    key
                } else if r < sequential_percent + random_percent {
                    self.below(loop_size)
                } else {
                    loop_size + self.below(loop_size)
                }
            },
            Workload::WorkloadShift {
                initial_keys,
                phases,
                operations,
            } => self.shift_key(op, initial_keys, phases, operations),
        }
    }

    fn shift_key(&mut self, op: u64, initial_keys: u64, phases: u64, operations: u64) -> u64 {
        let phase_len = (operations / phases.max(1)).max(1);
        let phase = op / phase_len;
        match phase % 5 {
            0 => self.below(5),
            1 => self.below(initial_keys),
            2 => (op - phase * phase_len) % 100,
            3 => {
                let locality = (op / 1000) % 10;
                locality * 20 + self.below(20)
            },
            _ => {
                let r = self.below(100);
                if r < 30 {
                    self.below(5)
                } else if r < 60 {
                    5 + self.below(95)
                } else {
                    100 + self.below(initial_keys.saturating_sub(100))
                }
            },
        }
    }

    /// Uniform draw from `[0, n)`; 0 when `n` is 0.
    fn below(&mut self, n: u64) -> u64 {
        if n == 0 {
            0
        } else {
            self.rng.random_range(0..n)
        }
    }
}
