/// Counters shared by every policy, copied at snapshot time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CoreMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,

    pub evicted_entries: u64,
    pub removals: u64,
    pub clears: u64,

    pub peek_calls: u64,
    pub peek_found: u64,
}

impl CoreMetricsSnapshot {
    /// Fraction of `get` calls that hit; 0.0 before the first `get`.
    pub fn hit_ratio(&self) -> f64 {
        if self.get_calls == 0 {
            0.0
        } else {
            self.get_hits as f64 / self.get_calls as f64
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct LruMetricsSnapshot {
    pub core: CoreMetricsSnapshot,

    pub pop_lru_calls: u64,
    pub pop_lru_found: u64,
    pub touch_calls: u64,
    pub touch_found: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub capacity: usize,
}

impl LruMetricsSnapshot {
    pub fn hit_ratio(&self) -> f64 {
        self.core.hit_ratio()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct LfuMetricsSnapshot {
    pub core: CoreMetricsSnapshot,

    pub pop_lfu_calls: u64,
    pub pop_lfu_found: u64,
    pub aging_events: u64,

    pub cache_len: usize,
    pub capacity: usize,
    pub total_frequency: u64,
}

impl LfuMetricsSnapshot {
    pub fn hit_ratio(&self) -> f64 {
        self.core.hit_ratio()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ArcMetricsSnapshot {
    pub core: CoreMetricsSnapshot,

    pub t1_to_t2_promotions: u64,
    pub b1_ghost_hits: u64,
    pub b2_ghost_hits: u64,
    pub ghost_refreshes: u64,
    pub target_increases: u64,
    pub target_decreases: u64,
    pub t1_evictions: u64,
    pub t2_evictions: u64,
    pub ghost_expiries: u64,

    pub cache_len: usize,
    pub capacity: usize,
    pub target_t1: usize,
    pub t1_len: usize,
    pub t2_len: usize,
    pub b1_len: usize,
    pub b2_len: usize,
}

impl ArcMetricsSnapshot {
    pub fn hit_ratio(&self) -> f64 {
        self.core.hit_ratio()
    }
}
