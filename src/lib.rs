//! cacheplex: in-process key-value caches with LRU, LFU and ARC eviction.
//!
//! Every engine implements [`traits::CachePolicy`], so callers can swap
//! policies without touching call sites. Engines are single-threaded; wrap
//! them with the types in `concurrent` (feature `concurrency`) to share
//! across threads.
//!
//! ```rust
//! use cacheplex::prelude::*;
//!
//! let mut cache = ArcCache::new(2);
//! cache.put("a", 1);
//! cache.put("b", 2);
//! assert_eq!(cache.get(&"a"), Some(&1));
//! cache.put("c", 3);
//! assert_eq!(cache.len(), 2);
//! ```

pub mod builder;
pub mod ds;
pub mod error;
pub mod policy;

#[cfg(feature = "concurrency")]
pub mod concurrent;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod traits;
