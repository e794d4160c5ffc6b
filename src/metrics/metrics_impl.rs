use crate::metrics::cell::MetricsCell;
use crate::metrics::snapshot::CoreMetricsSnapshot;
use crate::metrics::traits::{
    ArcMetricsRecorder, CoreMetricsRecorder, LfuMetricsRecorder, LruMetricsRecorder,
    ReadMetricsRecorder,
};

/// Counters shared by every policy.
#[derive(Debug, Default)]
pub struct CoreMetrics {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,
    pub evicted_entries: u64,
    pub removals: u64,
    pub clears: u64,
    pub peek_calls: MetricsCell,
    pub peek_found: MetricsCell,
}

impl CoreMetrics {
    pub fn snapshot(&self) -> CoreMetricsSnapshot {
        CoreMetricsSnapshot {
            get_calls: self.get_calls,
            get_hits: self.get_hits,
            get_misses: self.get_misses,
            insert_calls: self.insert_calls,
            insert_updates: self.insert_updates,
            insert_new: self.insert_new,
            evicted_entries: self.evicted_entries,
            removals: self.removals,
            clears: self.clears,
            peek_calls: self.peek_calls.get(),
            peek_found: self.peek_found.get(),
        }
    }
}

/// Implements the core and read recorders by forwarding to a `core` field.
macro_rules! impl_core_recorders {
    ($ty:ty) => {
        impl CoreMetricsRecorder for $ty {
            fn record_get_hit(&mut self) {
                self.core.get_calls += 1;
                self.core.get_hits += 1;
            }
            fn record_get_miss(&mut self) {
                self.core.get_calls += 1;
                self.core.get_misses += 1;
            }
            fn record_insert_call(&mut self) {
                self.core.insert_calls += 1;
            }
            fn record_insert_new(&mut self) {
                self.core.insert_new += 1;
            }
            fn record_insert_update(&mut self) {
                self.core.insert_updates += 1;
            }
            fn record_evicted_entry(&mut self) {
                self.core.evicted_entries += 1;
            }
            fn record_remove(&mut self) {
                self.core.removals += 1;
            }
            fn record_clear(&mut self) {
                self.core.clears += 1;
            }
        }

        impl ReadMetricsRecorder for $ty {
            fn record_peek_call(&self) {
                self.core.peek_calls.incr();
            }
            fn record_peek_found(&self) {
                self.core.peek_found.incr();
            }
        }
    };
}

#[derive(Debug, Default)]
pub struct LruMetrics {
    pub core: CoreMetrics,
    pub pop_lru_calls: u64,
    pub pop_lru_found: u64,
    pub touch_calls: u64,
    pub touch_found: u64,
}

impl_core_recorders!(LruMetrics);

impl LruMetricsRecorder for LruMetrics {
    fn record_pop_lru_call(&mut self) {
        self.pop_lru_calls += 1;
    }
    fn record_pop_lru_found(&mut self) {
        self.pop_lru_found += 1;
    }
    fn record_touch_call(&mut self) {
        self.touch_calls += 1;
    }
    fn record_touch_found(&mut self) {
        self.touch_found += 1;
    }
}

#[derive(Debug, Default)]
pub struct LfuMetrics {
    pub core: CoreMetrics,
    pub pop_lfu_calls: u64,
    pub pop_lfu_found: u64,
    pub aging_events: u64,
}

impl_core_recorders!(LfuMetrics);

impl LfuMetricsRecorder for LfuMetrics {
    fn record_pop_lfu_call(&mut self) {
        self.pop_lfu_calls += 1;
    }
    fn record_pop_lfu_found(&mut self) {
        self.pop_lfu_found += 1;
    }
    fn record_aging_event(&mut self) {
        self.aging_events += 1;
    }
}

#[derive(Debug, Default)]
pub struct ArcMetrics {
    pub core: CoreMetrics,
    pub t1_to_t2_promotions: u64,
    pub b1_ghost_hits: u64,
    pub b2_ghost_hits: u64,
    pub ghost_refreshes: u64,
    pub target_increases: u64,
    pub target_decreases: u64,
    pub t1_evictions: u64,
    pub t2_evictions: u64,
    pub ghost_expiries: u64,
}

impl_core_recorders!(ArcMetrics);

impl ArcMetricsRecorder for ArcMetrics {
    fn record_t1_to_t2_promotion(&mut self) {
        self.t1_to_t2_promotions += 1;
    }
    fn record_b1_ghost_hit(&mut self) {
        self.b1_ghost_hits += 1;
    }
    fn record_b2_ghost_hit(&mut self) {
        self.b2_ghost_hits += 1;
    }
    fn record_ghost_refresh(&mut self) {
        self.ghost_refreshes += 1;
    }
    fn record_target_increase(&mut self) {
        self.target_increases += 1;
    }
    fn record_target_decrease(&mut self) {
        self.target_decreases += 1;
    }
    fn record_t1_eviction(&mut self) {
        self.t1_evictions += 1;
    }
    fn record_t2_eviction(&mut self) {
        self.t2_evictions += 1;
    }
    fn record_ghost_expiry(&mut self) {
        self.ghost_expiries += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_counters_split_hits_and_misses() {
        let mut metrics = LruMetrics::default();
        metrics.record_get_hit();
        metrics.record_get_hit();
        metrics.record_get_miss();
        metrics.record_peek_call();

        let snap = metrics.core.snapshot();
        assert_eq!(snap.get_calls, 3);
        assert_eq!(snap.get_hits, 2);
        assert_eq!(snap.get_misses, 1);
        assert_eq!(snap.peek_calls, 1);
        assert_eq!(snap.peek_found, 0);
    }

    #[test]
    fn arc_counters_track_ghost_traffic() {
        let mut metrics = ArcMetrics::default();
        metrics.record_b1_ghost_hit();
        metrics.record_target_increase();
        metrics.record_b2_ghost_hit();
        metrics.record_target_decrease();
        metrics.record_ghost_expiry();
        assert_eq!(metrics.b1_ghost_hits, 1);
        assert_eq!(metrics.b2_ghost_hits, 1);
        assert_eq!(metrics.target_increases, 1);
        assert_eq!(metrics.target_decreases, 1);
        assert_eq!(metrics.ghost_expiries, 1);
    }
}
