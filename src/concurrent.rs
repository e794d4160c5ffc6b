//! Thread-safe composition of the single-threaded engines.
//!
//! Engines carry no internal locking. Two wrappers cover the usual ways of
//! sharing one:
//!
//! - [`SyncCache`]: one `parking_lot::Mutex` around a whole engine. Every
//!   operation sees a consistent total order.
//! - [`ShardedCache`]: independent engines selected by a seeded key hash.
//!   Eviction decisions are made per shard, so the combined cache is only
//!   approximately LRU/LFU/ARC, but unrelated keys stop contending.
//!
//! `get` bumps recency or frequency state, so both wrappers take the lock
//! exclusively and hand back a clone of the value. Use `get_with` to work
//! on the value in place.
//!
//! ```
//! use std::thread;
//! use cacheplex::concurrent::SyncCache;
//! use cacheplex::policy::LruCache;
//!
//! let cache = SyncCache::new(LruCache::new(64));
//! let handles: Vec<_> = (0..4u64)
//!     .map(|t| {
//!         let cache = cache.clone();
//!         thread::spawn(move || {
//!             cache.put(t, t * 10);
//!         })
//!     })
//!     .collect();
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! assert_eq!(cache.get(&3), Some(30));
//! ```

use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::ds::ShardSelector;
use crate::traits::CachePolicy;

/// A cache engine behind a single mutex. Cloning shares the same engine.
#[derive(Debug)]
pub struct SyncCache<C> {
    inner: Arc<Mutex<C>>,
}

impl<C> Clone for SyncCache<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C> SyncCache<C> {
    pub fn new(cache: C) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    /// Looks up `key` and returns a clone of the value.
    pub fn get<K, V>(&self, key: &K) -> Option<V>
    where
        C: CachePolicy<K, V>,
        V: Clone,
    {
        self.inner.lock().get(key).cloned()
    }

    /// Looks up `key` and applies `f` to the value while the lock is held.
    pub fn get_with<K, V, R>(&self, key: &K, f: impl FnOnce(&V) -> R) -> Option<R>
    where
        C: CachePolicy<K, V>,
    {
        self.inner.lock().get(key).map(f)
    }

    pub fn put<K, V>(&self, key: K, value: V) -> Option<V>
    where
        C: CachePolicy<K, V>,
    {
        self.inner.lock().put(key, value)
    }

    pub fn peek<K, V>(&self, key: &K) -> Option<V>
    where
        C: CachePolicy<K, V>,
        V: Clone,
    {
        self.inner.lock().peek(key).cloned()
    }

    pub fn contains<K, V>(&self, key: &K) -> bool
    where
        C: CachePolicy<K, V>,
    {
        self.inner.lock().contains(key)
    }

    pub fn remove<K, V>(&self, key: &K) -> Option<V>
    where
        C: CachePolicy<K, V>,
    {
        self.inner.lock().remove(key)
    }

    pub fn len<K, V>(&self) -> usize
    where
        C: CachePolicy<K, V>,
    {
        self.inner.lock().len()
    }

    pub fn capacity<K, V>(&self) -> usize
    where
        C: CachePolicy<K, V>,
    {
        self.inner.lock().capacity()
    }

    pub fn clear<K, V>(&self)
    where
        C: CachePolicy<K, V>,
    {
        self.inner.lock().clear();
    }

    /// Runs `f` with exclusive access to the engine, for engine-specific
    /// calls such as `check_invariants`.
    pub fn with_inner<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

/// Independent engines, each behind its own mutex, chosen by key hash.
#[derive(Debug)]
pub struct ShardedCache<C> {
    shards: Vec<Mutex<C>>,
    selector: ShardSelector,
}

impl<C> ShardedCache<C> {
    /// Splits `capacity` across `shards` engines built by `make`.
    ///
    /// `make` receives each shard's capacity. The split is exact: the first
    /// `capacity % shards` shards get one extra slot. A shard count of zero
    /// is treated as one.
    pub fn new(shards: usize, capacity: usize, seed: u64, mut make: impl FnMut(usize) -> C) -> Self {
        let selector = ShardSelector::new(shards, seed);
        let count = selector.shard_count();
        let base = capacity / count;
        let extra = capacity % count;
        let shards = (0..count)
            .map(|i| Mutex::new(make(base + usize::from(i < extra))))
            .collect();
        debug!(shards = count, capacity, "sharded cache created");
        Self { shards, selector }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard<K: Hash>(&self, key: &K) -> &Mutex<C> {
        &self.shards[self.selector.shard_for_key(key)]
    }

    pub fn get<K, V>(&self, key: &K) -> Option<V>
    where
        C: CachePolicy<K, V>,
        K: Hash,
        V: Clone,
    {
        self.shard(key).lock().get(key).cloned()
    }

    pub fn get_with<K, V, R>(&self, key: &K, f: impl FnOnce(&V) -> R) -> Option<R>
    where
        C: CachePolicy<K, V>,
        K: Hash,
    {
        self.shard(key).lock().get(key).map(f)
    }

    pub fn put<K, V>(&self, key: K, value: V) -> Option<V>
    where
        C: CachePolicy<K, V>,
        K: Hash,
    {
        self.shard(&key).lock().put(key, value)
    }

    pub fn peek<K, V>(&self, key: &K) -> Option<V>
    where
        C: CachePolicy<K, V>,
        K: Hash,
        V: Clone,
    {
        self.shard(key).lock().peek(key).cloned()
    }

    pub fn contains<K, V>(&self, key: &K) -> bool
    where
        C: CachePolicy<K, V>,
        K: Hash,
    {
        self.shard(key).lock().contains(key)
    }

    pub fn remove<K, V>(&self, key: &K) -> Option<V>
    where
        C: CachePolicy<K, V>,
        K: Hash,
    {
        self.shard(key).lock().remove(key)
    }

    /// Sum of shard lengths. Shards are locked one at a time, so the total
    /// may mix states from different moments under concurrent writes.
    pub fn len<K, V>(&self) -> usize
    where
        C: CachePolicy<K, V>,
    {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    pub fn capacity<K, V>(&self) -> usize
    where
        C: CachePolicy<K, V>,
    {
        self.shards.iter().map(|shard| shard.lock().capacity()).sum()
    }

    pub fn clear<K, V>(&self)
    where
        C: CachePolicy<K, V>,
    {
        for shard in &self.shards {
            shard.lock().clear();
        }
    }

    /// Runs `f` on every shard in turn.
    pub fn for_each_shard(&self, mut f: impl FnMut(usize, &mut C)) {
        for (idx, shard) in self.shards.iter().enumerate() {
            f(idx, &mut shard.lock());
        }
    }
}
