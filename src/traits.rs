//! # The cache interface
//!
//! Every eviction engine in this crate implements [`CachePolicy`]. Callers
//! that should not care which policy they are driving (benchmark harnesses,
//! the [`Cache`](crate::builder::Cache) returned by the builder, the
//! concurrent wrappers) program against this trait.
//!
//! ```text
//!                    ┌──────────────────────────────────────┐
//!                    │          CachePolicy<K, V>           │
//!                    │                                      │
//!                    │  get(&mut, &K)    → Option<&V>       │
//!                    │  put(&mut, K, V)  → Option<V>        │
//!                    │  peek(&, &K)      → Option<&V>       │
//!                    │  contains(&, &K)  → bool             │
//!                    │  remove(&mut, &K) → Option<V>        │
//!                    │  len / is_empty / capacity / clear   │
//!                    └──────────────────┬───────────────────┘
//!                                       │
//!            ┌──────────────────────────┼──────────────────────────┐
//!            ▼                          ▼                          ▼
//!   ┌──────────────────┐       ┌──────────────────┐       ┌──────────────────┐
//!   │  LruCache<K, V>  │       │  LfuCache<K, V>  │       │  ArcCache<K, V>  │
//!   │  recency list    │       │  freq buckets    │       │  T1/T2 + B1/B2   │
//!   └──────────────────┘       └──────────────────┘       └──────────────────┘
//! ```
//!
//! ## `get` is a write
//!
//! `get` takes `&mut self`: a hit promotes the entry (LRU, ARC) or bumps its
//! frequency (LFU), and may trigger an LFU aging pass. Anything layered on
//! top that assumes reads are side-effect free must use [`CachePolicy::peek`]
//! instead.
//!
//! ## Capacity zero
//!
//! An engine built with capacity 0 is a pass-through: `put` stores nothing and
//! every `get` misses. This is not an error.
//!
//! ## Example
//!
//! ```
//! use cacheplex::policy::{ArcCache, LfuCache, LruCache};
//! use cacheplex::traits::CachePolicy;
//!
//! fn warm(cache: &mut dyn CachePolicy<u32, String>) -> usize {
//!     for k in 0..4 {
//!         cache.put(k, format!("v{k}"));
//!     }
//!     (0..4).filter(|k| cache.get(k).is_some()).count()
//! }
//!
//! assert_eq!(warm(&mut LruCache::new(2)), 2);
//! assert_eq!(warm(&mut LfuCache::new(2)), 2);
//! assert_eq!(warm(&mut ArcCache::new(2)), 2);
//! ```

/// Uniform key-value cache interface shared by all eviction policies.
///
/// The trait is object safe; harnesses typically hold a
/// `Box<dyn CachePolicy<K, V>>`.
pub trait CachePolicy<K, V> {
    /// Looks up `key`, recording the access.
    ///
    /// Returns `None` on a miss. A hit updates the policy's bookkeeping, so
    /// this takes `&mut self`.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Inserts or overwrites `key`.
    ///
    /// Never fails. If the cache is full and `key` is new, one resident entry
    /// is evicted first. Returns the previous value when `key` was already
    /// resident.
    fn put(&mut self, key: K, value: V) -> Option<V>;

    /// Returns `true` if `key` is resident. Does not count as an access.
    fn contains(&self, key: &K) -> bool;

    /// Reads `key` without touching recency or frequency state.
    fn peek(&self, key: &K) -> Option<&V>;

    /// Drops `key` from the cache and returns its value.
    ///
    /// Explicit removal is not an eviction; ARC records no ghost for it.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Number of resident entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of resident entries.
    fn capacity(&self) -> usize;

    /// Removes every entry and resets adaptive state.
    fn clear(&mut self);
}
