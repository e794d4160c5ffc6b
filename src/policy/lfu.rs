//! # Least Frequently Used (LFU) cache with aging
//!
//! Evicts the entry with the lowest access count; among equal counts, the one
//! touched least recently goes first. Counts are periodically decayed so that
//! a key which was hot long ago cannot pin itself in the cache forever.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                          LfuCache<K, V>                              │
//!   │                                                                      │
//!   │   freqs: FrequencyBuckets<K>          values: FxHashMap<K, V>        │
//!   │   ┌──────────────────────────────┐    ┌──────────────────────┐       │
//!   │   │ min_freq = 1                 │    │ page_1 → v1          │       │
//!   │   │ freq=1: [page_3]             │    │ page_2 → v2          │       │
//!   │   │ freq=3: [page_2]             │    │ page_3 → v3          │       │
//!   │   │ freq=9: [page_1]             │    └──────────────────────┘       │
//!   │   └──────────────────────────────┘                                   │
//!   │                                                                      │
//!   │   config: LfuConfig { aging, decay }                                 │
//!   │   ops_since_aging, aging_events                                      │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## LFU vs LRU
//!
//! ```text
//!   Access pattern: A, B, A, C, A, D, A, E   (capacity 3)
//!
//!   LRU:  insert E evicts A's neighbours in age order; A survives only
//!         while it keeps being re-read before falling off the tail.
//!   LFU:  {A:4, C:1, D:1} → insert E evicts C (freq 1, least recent)
//! ```
//!
//! ## Aging
//!
//! ```text
//!   AgingTrigger::AverageFrequency { max_average: 10 }   (default)
//!       total_frequency > max_average × len  → decay every count
//!
//!   AgingTrigger::Operations { interval }
//!       every `interval` get/put calls       → decay every count
//!
//!   FrequencyDecay::Halve        f → max(1, f / 2)     (default)
//!   FrequencyDecay::Subtract(n)  f → max(1, f - n)
//! ```
//!
//! Decay keeps the relative recency of keys that end up sharing a count, so
//! eviction order among them is unchanged. An aging pass is O(n log n) and
//! runs inside the `get`/`put` that triggers it.
//!
//! ## Example
//!
//! ```
//! use cacheplex::policy::LfuCache;
//! use cacheplex::traits::CachePolicy;
//!
//! let mut cache = LfuCache::new(2);
//! cache.put("hot", 1);
//! cache.put("cold", 2);
//! cache.get(&"hot");
//! cache.put("new", 3); // evicts "cold"
//!
//! assert!(cache.contains(&"hot"));
//! assert!(!cache.contains(&"cold"));
//! assert_eq!(cache.frequency(&"hot"), Some(2));
//! ```

use std::hash::Hash;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::ds::FrequencyBuckets;
use crate::error::{ConfigError, InvariantError, ensure_invariant};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::LfuMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LfuMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CoreMetricsRecorder, LfuMetricsRecorder, MetricsSnapshotProvider, ReadMetricsRecorder,
};
use crate::traits::CachePolicy;

/// Average frequency above which the default trigger ages the cache.
pub const DEFAULT_MAX_AVERAGE_FREQUENCY: u64 = 10;

/// When an aging pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgingTrigger {
    /// Counts only ever grow.
    Disabled,
    /// Age after every `interval` calls to `get` or `put`.
    Operations { interval: u64 },
    /// Age whenever the mean count of resident entries exceeds `max_average`.
    AverageFrequency { max_average: u64 },
}

impl Default for AgingTrigger {
    fn default() -> Self {
        Self::AverageFrequency {
            max_average: DEFAULT_MAX_AVERAGE_FREQUENCY,
        }
    }
}

/// How an aging pass rewrites each count. Results never drop below 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrequencyDecay {
    #[default]
    Halve,
    Subtract(u64),
}

impl FrequencyDecay {
    /// Applies the decay to a single count.
    pub fn apply(self, freq: u64) -> u64 {
        let decayed = match self {
            Self::Halve => freq / 2,
            Self::Subtract(n) => freq.saturating_sub(n),
        };
        decayed.max(1)
    }
}

/// Tunables for [`LfuCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LfuConfig {
    pub aging: AgingTrigger,
    pub decay: FrequencyDecay,
}

impl LfuConfig {
    /// Rejects triggers and decays that are zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.aging {
            AgingTrigger::Operations { interval: 0 } => {
                return Err(ConfigError::must_be_positive("aging interval"));
            },
            AgingTrigger::AverageFrequency { max_average: 0 } => {
                return Err(ConfigError::must_be_positive("max average frequency"));
            },
            _ => {},
        }
        if self.decay == FrequencyDecay::Subtract(0) {
            return Err(ConfigError::must_be_positive("decay subtrahend"));
        }
        Ok(())
    }
}

/// Frequency-ordered cache with least-recent tie breaking and aging.
#[derive(Debug)]
pub struct LfuCache<K, V> {
    values: FxHashMap<K, V>,
    freqs: FrequencyBuckets<K>,
    capacity: usize,
    config: LfuConfig,
    ops_since_aging: u64,
    aging_events: u64,
    #[cfg(feature = "metrics")]
    metrics: LfuMetrics,
}

impl<K, V> LfuCache<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates an LFU cache with the default aging policy.
    pub fn new(capacity: usize) -> Self {
        Self::build(capacity, LfuConfig::default())
    }

    /// Creates an LFU cache with explicit aging settings.
    ///
    /// # Panics
    ///
    /// Panics if `config` fails [`LfuConfig::validate`]. Use
    /// [`try_with_config`](Self::try_with_config) to handle that case.
    pub fn with_config(capacity: usize, config: LfuConfig) -> Self {
        match Self::try_with_config(capacity, config) {
            Ok(cache) => cache,
            Err(err) => panic!("invalid LFU configuration: {err}"),
        }
    }

    /// Fallible form of [`with_config`](Self::with_config).
    pub fn try_with_config(capacity: usize, config: LfuConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(capacity, config))
    }

    fn build(capacity: usize, config: LfuConfig) -> Self {
        debug!(capacity, ?config, "creating lfu cache");
        Self {
            values: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            freqs: FrequencyBuckets::with_capacity(capacity),
            capacity,
            config,
            ops_since_aging: 0,
            aging_events: 0,
            #[cfg(feature = "metrics")]
            metrics: LfuMetrics::default(),
        }
    }

    pub fn config(&self) -> LfuConfig {
        self.config
    }

    /// Current access count of `key`.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.freqs.frequency(key)
    }

    /// Number of aging passes run so far.
    pub fn aging_events(&self) -> u64 {
        self.aging_events
    }

    /// Returns the next eviction victim without touching it.
    pub fn peek_lfu(&self) -> Option<(&K, &V)> {
        let (key, _) = self.freqs.peek_min()?;
        self.values.get_key_value(key)
    }

    /// Removes and returns the next eviction victim.
    pub fn pop_lfu(&mut self) -> Option<(K, V)> {
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_lfu_call();

        let (key, _) = self.freqs.pop_min()?;
        let value = self.values.remove(&key)?;

        #[cfg(feature = "metrics")]
        self.metrics.record_pop_lfu_found();
        Some((key, value))
    }

    /// Counts one `get`/`put` and runs an aging pass if the trigger fires.
    fn after_operation(&mut self) {
        self.ops_since_aging = self.ops_since_aging.saturating_add(1);
        let due = match self.config.aging {
            AgingTrigger::Disabled => false,
            AgingTrigger::Operations { interval } => self.ops_since_aging >= interval,
            AgingTrigger::AverageFrequency { max_average } => {
                let len = self.freqs.len() as u64;
                len > 0 && self.freqs.total_frequency() > max_average.saturating_mul(len)
            },
        };
        if due {
            self.age();
        }
    }

    fn age(&mut self) {
        let decay = self.config.decay;
        match decay {
            FrequencyDecay::Halve => self.freqs.decay_halve(),
            FrequencyDecay::Subtract(_) => self.freqs.decay_with(|freq| decay.apply(freq)),
        }
        self.ops_since_aging = 0;
        self.aging_events += 1;

        #[cfg(feature = "metrics")]
        self.metrics.record_aging_event();

        debug!(
            entries = self.freqs.len(),
            total_frequency = self.freqs.total_frequency(),
            aging_events = self.aging_events,
            "lfu aging pass"
        );
    }

    fn evict_lfu(&mut self) {
        if let Some((key, freq)) = self.freqs.pop_min() {
            self.values.remove(&key);
            trace!(freq, "lfu evicted least frequent entry");
            #[cfg(feature = "metrics")]
            self.metrics.record_evicted_entry();
        }
    }

    /// Verifies the value map and the frequency structure agree.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.freqs.check_invariants()?;
        ensure_invariant!(
            self.values.len() == self.freqs.len(),
            "lfu holds {} values but tracks {} frequencies",
            self.values.len(),
            self.freqs.len()
        );
        ensure_invariant!(
            self.values.len() <= self.capacity,
            "lfu holds {} entries over capacity {}",
            self.values.len(),
            self.capacity
        );
        for (key, freq) in self.freqs.iter() {
            ensure_invariant!(freq >= 1, "lfu entry has frequency {freq}");
            ensure_invariant!(
                self.values.contains_key(key),
                "lfu tracks a frequency for a key with no value"
            );
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("{err}");
        }
    }
}

impl<K, V> CachePolicy<K, V> for LfuCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        let hit = self.freqs.touch(key).is_some();

        #[cfg(feature = "metrics")]
        if hit {
            self.metrics.record_get_hit();
        } else {
            self.metrics.record_get_miss();
        }

        self.after_operation();
        if hit { self.values.get(key) } else { None }
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        if self.capacity == 0 {
            return None;
        }

        if let Some(slot) = self.values.get_mut(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();

            let previous = std::mem::replace(slot, value);
            self.freqs.touch(&key);
            self.after_operation();
            return Some(previous);
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        if self.values.len() >= self.capacity {
            self.evict_lfu();
        }
        self.freqs.insert(key.clone());
        self.values.insert(key, value);
        self.after_operation();

        debug_assert!(self.values.len() <= self.capacity);
        None
    }

    fn contains(&self, key: &K) -> bool {
        self.values.contains_key(key)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_peek_call();

        let value = self.values.get(key)?;

        #[cfg(feature = "metrics")]
        self.metrics.record_peek_found();
        Some(value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        let value = self.values.remove(key)?;
        self.freqs.remove(key);

        #[cfg(feature = "metrics")]
        self.metrics.record_remove();
        Some(value)
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        self.values.clear();
        self.freqs.clear();
        self.ops_since_aging = 0;
    }
}

#[cfg(feature = "metrics")]
impl<K, V> LfuCache<K, V>
where
    K: Clone + Eq + Hash,
{
    pub fn metrics_snapshot(&self) -> LfuMetricsSnapshot {
        LfuMetricsSnapshot {
            core: self.metrics.core.snapshot(),
            pop_lfu_calls: self.metrics.pop_lfu_calls,
            pop_lfu_found: self.metrics.pop_lfu_found,
            aging_events: self.metrics.aging_events,
            cache_len: self.values.len(),
            capacity: self.capacity,
            total_frequency: self.freqs.total_frequency(),
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LfuMetricsSnapshot> for LfuCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn snapshot(&self) -> LfuMetricsSnapshot {
        self.metrics_snapshot()
    }
}
