//! # Metrics recorder traits
//!
//! Recording is split from snapshotting so engines only ever write counters
//! and readers only ever take copies.
//!
//! ```text
//!                     ┌─────────────────────────────┐
//!                     │     CoreMetricsRecorder     │
//!                     │  get_hit/get_miss/insert    │
//!                     │  evict/remove/clear         │
//!                     └──────────────┬──────────────┘
//!                                    │
//!          ┌─────────────────────────┼─────────────────────────┐
//!          ▼                         ▼                         ▼
//!   ┌──────────────┐         ┌──────────────┐         ┌──────────────┐
//!   │ LruRecorder  │         │ LfuRecorder  │         │ ArcRecorder  │
//!   │ pop/touch    │         │ pop/aging    │         │ ghosts/target│
//!   └──────────────┘         └──────────────┘         └──────────────┘
//!
//!   MetricsSnapshotProvider<S>: engine → Copy snapshot (tests, benches)
//! ```

/// Counters every policy records.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_insert_call(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_update(&mut self);
    fn record_evicted_entry(&mut self);
    fn record_remove(&mut self);
    fn record_clear(&mut self);
}

/// Counters for `&self` reads, backed by interior mutability.
pub trait ReadMetricsRecorder {
    fn record_peek_call(&self);
    fn record_peek_found(&self);
}

/// LRU-specific counters.
pub trait LruMetricsRecorder: CoreMetricsRecorder {
    fn record_pop_lru_call(&mut self);
    fn record_pop_lru_found(&mut self);
    fn record_touch_call(&mut self);
    fn record_touch_found(&mut self);
}

/// LFU-specific counters.
pub trait LfuMetricsRecorder: CoreMetricsRecorder {
    fn record_pop_lfu_call(&mut self);
    fn record_pop_lfu_found(&mut self);
    fn record_aging_event(&mut self);
}

/// ARC-specific counters (promotions, ghost traffic, target movement).
pub trait ArcMetricsRecorder: CoreMetricsRecorder {
    fn record_t1_to_t2_promotion(&mut self);
    fn record_b1_ghost_hit(&mut self);
    fn record_b2_ghost_hit(&mut self);
    fn record_ghost_refresh(&mut self);
    fn record_target_increase(&mut self);
    fn record_target_decrease(&mut self);
    fn record_t1_eviction(&mut self);
    fn record_t2_eviction(&mut self);
    fn record_ghost_expiry(&mut self);
}

/// Produces a point-in-time copy of an engine's counters.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}
