//! Per-policy counters, enabled with the `metrics` feature.
//!
//! Each engine owns one recorder struct and implements
//! [`MetricsSnapshotProvider`](traits::MetricsSnapshotProvider) for its
//! snapshot type. Counters are plain integers; `peek` counts go through
//! [`MetricsCell`](cell::MetricsCell) because `peek` only borrows `&self`.

pub mod cell;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;
