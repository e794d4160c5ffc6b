//! Eviction engines.
//!
//! | Engine | Evicts | Extra state |
//! |--------|--------|-------------|
//! | [`LruCache`] | least recently used | one recency list |
//! | [`LfuCache`] | least frequently used, oldest first on ties | frequency buckets, aging counter |
//! | [`ArcCache`] | adaptive between recency and frequency | T1/T2 lists, B1/B2 ghosts, target size |

pub mod arc;
pub mod lfu;
pub mod lru;

pub use arc::{ArcCache, ArcConfig};
pub use lfu::{AgingTrigger, DEFAULT_MAX_AVERAGE_FREQUENCY, FrequencyDecay, LfuCache, LfuConfig};
pub use lru::LruCache;
