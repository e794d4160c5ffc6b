pub use crate::builder::{Cache, CacheBuilder, PolicyKind};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::policy::{
    AgingTrigger, ArcCache, ArcConfig, FrequencyDecay, LfuCache, LfuConfig, LruCache,
};
pub use crate::traits::CachePolicy;

#[cfg(feature = "concurrency")]
pub use crate::concurrent::{ShardedCache, SyncCache};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::{
    ArcMetricsSnapshot, CoreMetricsSnapshot, LfuMetricsSnapshot, LruMetricsSnapshot,
};
#[cfg(feature = "metrics")]
pub use crate::metrics::traits::MetricsSnapshotProvider;
