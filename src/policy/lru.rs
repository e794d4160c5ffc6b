//! # Least Recently Used (LRU) cache
//!
//! Evicts the entry whose last access is oldest.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                          LruCache<K, V>                              │
//!   │                                                                      │
//!   │   index: FxHashMap<K, SlotId>                                        │
//!   │   ┌─────────┬────────┐                                               │
//!   │   │ page_1  │  id_1  │──────────┐                                    │
//!   │   │ page_2  │  id_2  │──────────┼──────┐                             │
//!   │   │ page_3  │  id_3  │──────────┼──────┼──────┐                      │
//!   │   └─────────┴────────┘          ▼      ▼      ▼                      │
//!   │                                                                      │
//!   │   list: IntrusiveList<Entry { key, value }>                          │
//!   │   head ──► [id_1] ◄──► [id_2] ◄──► [id_3] ◄── tail                   │
//!   │    (MRU)                                    (LRU, evicted first)     │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both the key and the value live in the list node; the index maps a key to
//! its node handle. Every operation is O(1) except [`LruCache::recency_rank`],
//! which walks the list.
//!
//! ## Operations
//!
//! ```text
//!   put(D) with capacity 3:
//!     head ──► [A] ◄──► [B] ◄──► [C] ◄── tail
//!     1. pop [C] from the tail
//!     2. push [D] at the head
//!     head ──► [D] ◄──► [A] ◄──► [B] ◄── tail
//!
//!   get(B):
//!     head ──► [B] ◄──► [D] ◄──► [A] ◄── tail
//!
//!   peek(A): no reordering
//! ```
//!
//! ## Example
//!
//! ```
//! use cacheplex::policy::LruCache;
//! use cacheplex::traits::CachePolicy;
//!
//! let mut cache = LruCache::new(2);
//! cache.put("a", 1);
//! cache.put("b", 2);
//! cache.get(&"a");
//! cache.put("c", 3); // evicts "b"
//!
//! assert!(cache.contains(&"a"));
//! assert!(!cache.contains(&"b"));
//! assert_eq!(cache.peek_lru(), Some((&"a", &1)));
//! ```

use std::hash::Hash;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::ds::{IntrusiveList, SlotId};
use crate::error::{InvariantError, ensure_invariant};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::LruMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LruMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CoreMetricsRecorder, LruMetricsRecorder, MetricsSnapshotProvider, ReadMetricsRecorder,
};
use crate::traits::CachePolicy;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Recency-ordered cache with O(1) promote and evict.
#[derive(Debug)]
pub struct LruCache<K, V> {
    list: IntrusiveList<Entry<K, V>>,
    index: FxHashMap<K, SlotId>,
    capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: LruMetrics,
}

impl<K, V> LruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates an LRU cache holding at most `capacity` entries.
    ///
    /// A capacity of 0 yields a cache that stores nothing.
    pub fn new(capacity: usize) -> Self {
        debug!(capacity, "creating lru cache");
        Self {
            list: IntrusiveList::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            capacity,
            #[cfg(feature = "metrics")]
            metrics: LruMetrics::default(),
        }
    }

    /// Returns the least recently used entry without touching it.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.list.back().map(|entry| (&entry.key, &entry.value))
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_lru_call();

        let entry = self.list.pop_back()?;
        self.index.remove(&entry.key);

        #[cfg(feature = "metrics")]
        self.metrics.record_pop_lru_found();
        Some((entry.key, entry.value))
    }

    /// Marks `key` as most recently used without reading it.
    ///
    /// Returns `false` if `key` is not resident.
    pub fn touch(&mut self, key: &K) -> bool {
        #[cfg(feature = "metrics")]
        self.metrics.record_touch_call();

        let Some(&id) = self.index.get(key) else {
            return false;
        };
        self.list.move_to_front(id);

        #[cfg(feature = "metrics")]
        self.metrics.record_touch_found();
        true
    }

    /// Position of `key` counted from the most recent end (0 = MRU).
    ///
    /// O(n): walks the recency list.
    pub fn recency_rank(&self, key: &K) -> Option<usize> {
        if !self.index.contains_key(key) {
            return None;
        }
        self.list.iter().position(|entry| &entry.key == key)
    }

    /// Iterates entries from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.list.iter().map(|entry| (&entry.key, &entry.value))
    }

    fn evict_lru(&mut self) {
        if let Some(entry) = self.list.pop_back() {
            self.index.remove(&entry.key);
            trace!(len = self.list.len(), "lru evicted least recent entry");
            #[cfg(feature = "metrics")]
            self.metrics.record_evicted_entry();
        }
    }

    /// Verifies that the index and the recency list describe the same keys.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        ensure_invariant!(
            self.index.len() == self.list.len(),
            "lru index has {} keys but list has {} nodes",
            self.index.len(),
            self.list.len()
        );
        ensure_invariant!(
            self.list.len() <= self.capacity,
            "lru holds {} entries over capacity {}",
            self.list.len(),
            self.capacity
        );
        for (key, &id) in &self.index {
            ensure_invariant!(
                self.list.get(id).is_some_and(|entry| &entry.key == key),
                "lru index entry points at slot {} holding another key",
                id.index()
            );
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.list.debug_validate_invariants();
        if let Err(err) = self.check_invariants() {
            panic!("{err}");
        }
    }
}

impl<K, V> CachePolicy<K, V> for LruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        let Some(&id) = self.index.get(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return None;
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        self.list.move_to_front(id);
        self.list.get(id).map(|entry| &entry.value)
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        if self.capacity == 0 {
            return None;
        }

        if let Some(&id) = self.index.get(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();

            self.list.move_to_front(id);
            return self
                .list
                .get_mut(id)
                .map(|entry| std::mem::replace(&mut entry.value, value));
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        if self.list.len() >= self.capacity {
            self.evict_lru();
        }

        let id = self.list.push_front(Entry {
            key: key.clone(),
            value,
        });
        self.index.insert(key, id);

        debug_assert!(self.list.len() <= self.capacity);
        None
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_peek_call();

        let id = self.index.get(key)?;

        #[cfg(feature = "metrics")]
        self.metrics.record_peek_found();
        self.list.get(*id).map(|entry| &entry.value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.index.remove(key)?;

        #[cfg(feature = "metrics")]
        self.metrics.record_remove();
        self.list.remove(id).map(|entry| entry.value)
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        self.list.clear();
        self.index.clear();
    }
}

#[cfg(feature = "metrics")]
impl<K, V> LruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    pub fn metrics_snapshot(&self) -> LruMetricsSnapshot {
        LruMetricsSnapshot {
            core: self.metrics.core.snapshot(),
            pop_lru_calls: self.metrics.pop_lru_calls,
            pop_lru_found: self.metrics.pop_lru_found,
            touch_calls: self.metrics.touch_calls,
            touch_found: self.metrics.touch_found,
            cache_len: self.index.len(),
            capacity: self.capacity,
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LruMetricsSnapshot> for LruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn snapshot(&self) -> LruMetricsSnapshot {
        self.metrics_snapshot()
    }
}
