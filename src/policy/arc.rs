//! Adaptive Replacement Cache (ARC).
//!
//! Splits the resident set into a recency side (T1, keys seen once) and a
//! frequency side (T2, keys seen at least twice), and remembers recently
//! evicted keys of each side in ghost lists (B1, B2). A request for a ghost
//! tells the cache which side it shrank too eagerly; the split point
//! `target_t1` moves toward that side.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                            ArcCache<K, V> Layout                            │
//! │                                                                             │
//! │   index: FxHashMap<K, Slot { list: T1 | T2, id: SlotId }>                   │
//! │                                                                             │
//! │   T1 (seen once)                        T2 (seen twice or more)             │
//! │   ┌─────────────────────────┐           ┌─────────────────────────┐         │
//! │   │ MRU               LRU   │           │ MRU               LRU   │         │
//! │   │ [k5] ◄──► [k2] ◄──► ... │           │ [k1] ◄──► [k7] ◄──► ... │         │
//! │   └────────────┬────────────┘           └────────────┬────────────┘         │
//! │                │ evict                               │ evict                │
//! │                ▼                                     ▼                      │
//! │   B1: GhostList<K> (keys only)          B2: GhostList<K> (keys only)        │
//! │                                                                             │
//! │   target_t1 ∈ [0, capacity]                                                 │
//! │     put(k) with k ∈ B1  → target_t1 += max(1, |B2| / |B1|)                  │
//! │     put(k) with k ∈ B2  → target_t1 -= max(1, |B1| / |B2|)                  │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Replacement
//!
//! When resident space must shrink by one:
//!
//! ```text
//!   if |T1| ≥ 1 and (|T1| > target_t1 or (ghost came from B2 and |T1| = target_t1))
//!       move T1's LRU key into B1
//!   else
//!       move T2's LRU key into B2
//! ```
//!
//! ## Bounds
//!
//! - `|T1| + |T2| ≤ capacity`
//! - `|T1| + |B1| ≤ capacity`
//! - `|T1| + |T2| + |B1| + |B2| ≤ 2 × capacity`
//! - a key is in at most one of T1, T2, B1, B2
//!
//! ## Ghosts and `get`
//!
//! Only `put` resurrects a ghost and moves `target_t1`. A `get` that misses
//! but finds the key in a ghost list just refreshes that ghost's position, so
//! the usual `get`-miss-then-`put` sequence adapts exactly once.
//!
//! ## Example
//!
//! ```
//! use cacheplex::policy::ArcCache;
//! use cacheplex::traits::CachePolicy;
//!
//! let mut cache = ArcCache::new(2);
//! cache.put("a", 1);
//! cache.put("b", 2);
//! assert_eq!(cache.get(&"a"), Some(&1)); // promoted to T2
//! cache.put("c", 3); // "b" leaves T1 for ghost list B1
//!
//! assert!(cache.contains_ghost(&"b"));
//! cache.put("b", 4); // ghost hit: recency side grows
//! assert_eq!(cache.target_t1_size(), 1);
//! assert_eq!(cache.get(&"b"), Some(&4));
//! ```

use std::hash::Hash;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::ds::{GhostList, IntrusiveList, SlotId};
use crate::error::{InvariantError, ensure_invariant};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::ArcMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::ArcMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    ArcMetricsRecorder, CoreMetricsRecorder, MetricsSnapshotProvider, ReadMetricsRecorder,
};
use crate::traits::CachePolicy;

/// Tunables for [`ArcCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArcConfig {
    /// Starting value of `target_t1`, clamped to `[0, capacity]`.
    pub initial_target: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    T1,
    T2,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    list: ListKind,
    id: SlotId,
}

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Which ghost list a resurrected key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GhostHit {
    None,
    B1,
    B2,
}

/// Self-tuning cache balancing recency (T1) against frequency (T2).
#[derive(Debug)]
pub struct ArcCache<K, V> {
    index: FxHashMap<K, Slot>,
    t1: IntrusiveList<Entry<K, V>>,
    t2: IntrusiveList<Entry<K, V>>,
    b1: GhostList<K>,
    b2: GhostList<K>,
    target_t1: usize,
    capacity: usize,
    config: ArcConfig,
    #[cfg(feature = "metrics")]
    metrics: ArcMetrics,
}

impl<K, V> ArcCache<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates an ARC cache with `target_t1` starting at 0.
    pub fn new(capacity: usize) -> Self {
        Self::with_config(capacity, ArcConfig::default())
    }

    pub fn with_config(capacity: usize, config: ArcConfig) -> Self {
        let target_t1 = config.initial_target.min(capacity);
        debug!(capacity, target_t1, "creating arc cache");
        Self {
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            t1: IntrusiveList::with_capacity(capacity),
            t2: IntrusiveList::with_capacity(capacity),
            b1: GhostList::new(capacity),
            b2: GhostList::new(capacity),
            target_t1,
            capacity,
            config,
            #[cfg(feature = "metrics")]
            metrics: ArcMetrics::default(),
        }
    }

    pub fn config(&self) -> ArcConfig {
        self.config
    }

    /// Current adaptive target for the size of T1.
    pub fn target_t1_size(&self) -> usize {
        self.target_t1
    }

    pub fn t1_len(&self) -> usize {
        self.t1.len()
    }

    pub fn t2_len(&self) -> usize {
        self.t2.len()
    }

    pub fn b1_len(&self) -> usize {
        self.b1.len()
    }

    pub fn b2_len(&self) -> usize {
        self.b2.len()
    }

    /// Returns `true` if `key` is remembered in B1 or B2.
    pub fn contains_ghost(&self, key: &K) -> bool {
        self.b1.contains(key) || self.b2.contains(key)
    }

    fn list_mut(&mut self, kind: ListKind) -> &mut IntrusiveList<Entry<K, V>> {
        match kind {
            ListKind::T1 => &mut self.t1,
            ListKind::T2 => &mut self.t2,
        }
    }

    fn list(&self, kind: ListKind) -> &IntrusiveList<Entry<K, V>> {
        match kind {
            ListKind::T1 => &self.t1,
            ListKind::T2 => &self.t2,
        }
    }

    /// Records a hit on a resident key: T1 entries move to T2, T2 entries
    /// move to T2's MRU end. Returns the entry's new slot.
    fn promote(&mut self, slot: Slot) -> Option<SlotId> {
        match slot.list {
            ListKind::T2 => {
                self.t2.move_to_front(slot.id);
                Some(slot.id)
            },
            ListKind::T1 => {
                let entry = self.t1.remove(slot.id)?;
                let key = entry.key.clone();
                let id = self.t2.push_front(entry);
                self.index.insert(
                    key,
                    Slot {
                        list: ListKind::T2,
                        id,
                    },
                );
                #[cfg(feature = "metrics")]
                self.metrics.record_t1_to_t2_promotion();
                Some(id)
            },
        }
    }

    /// Shrinks the resident set by one, demoting the victim to a ghost list.
    fn replace(&mut self, hit: GhostHit) {
        let t1_len = self.t1.len();
        let from_t1 = t1_len >= 1
            && (t1_len > self.target_t1
                || (hit == GhostHit::B2 && t1_len == self.target_t1)
                || self.t2.is_empty());

        if from_t1 {
            if let Some(entry) = self.t1.pop_back() {
                self.index.remove(&entry.key);
                let expired = self.b1.record(entry.key).is_some();
                trace!(expired, b1 = self.b1.len(), "arc demoted T1 entry to B1");
                #[cfg(feature = "metrics")]
                {
                    self.metrics.record_t1_eviction();
                    self.metrics.record_evicted_entry();
                    if expired {
                        self.metrics.record_ghost_expiry();
                    }
                }
            }
        } else if let Some(entry) = self.t2.pop_back() {
            self.index.remove(&entry.key);
            let expired = self.b2.record(entry.key).is_some();
            trace!(expired, b2 = self.b2.len(), "arc demoted T2 entry to B2");
            #[cfg(feature = "metrics")]
            {
                self.metrics.record_t2_eviction();
                self.metrics.record_evicted_entry();
                if expired {
                    self.metrics.record_ghost_expiry();
                }
            }
        }
    }

    /// Calls [`replace`](Self::replace) only when the resident set is full.
    fn make_room(&mut self, hit: GhostHit) {
        if self.t1.len() + self.t2.len() >= self.capacity {
            self.replace(hit);
        }
    }

    fn grow_target(&mut self) {
        let delta = (self.b2.len() / self.b1.len().max(1)).max(1);
        self.target_t1 = (self.target_t1 + delta).min(self.capacity);
        trace!(delta, target_t1 = self.target_t1, "arc B1 ghost hit, target grows");
        #[cfg(feature = "metrics")]
        {
            self.metrics.record_b1_ghost_hit();
            self.metrics.record_target_increase();
        }
    }

    fn shrink_target(&mut self) {
        let delta = (self.b1.len() / self.b2.len().max(1)).max(1);
        self.target_t1 = self.target_t1.saturating_sub(delta);
        trace!(delta, target_t1 = self.target_t1, "arc B2 ghost hit, target shrinks");
        #[cfg(feature = "metrics")]
        {
            self.metrics.record_b2_ghost_hit();
            self.metrics.record_target_decrease();
        }
    }

    /// Frees space for a key that is in none of the four lists.
    fn admit_new(&mut self) {
        let l1 = self.t1.len() + self.b1.len();
        let total = l1 + self.t2.len() + self.b2.len();

        if l1 >= self.capacity {
            if self.t1.len() < self.capacity {
                self.b1.pop_oldest();
                #[cfg(feature = "metrics")]
                self.metrics.record_ghost_expiry();
                self.make_room(GhostHit::None);
            } else if let Some(entry) = self.t1.pop_back() {
                // T1 alone fills the cache: drop its LRU without a ghost.
                self.index.remove(&entry.key);
                trace!("arc dropped T1 entry without ghost");
                #[cfg(feature = "metrics")]
                {
                    self.metrics.record_t1_eviction();
                    self.metrics.record_evicted_entry();
                }
            }
        } else if total >= self.capacity {
            if total >= 2 * self.capacity {
                self.b2.pop_oldest();
                #[cfg(feature = "metrics")]
                self.metrics.record_ghost_expiry();
            }
            self.make_room(GhostHit::None);
        }
    }

    fn insert_front(&mut self, kind: ListKind, key: K, value: V) {
        let id = self.list_mut(kind).push_front(Entry {
            key: key.clone(),
            value,
        });
        self.index.insert(key, Slot { list: kind, id });
    }

    /// Checks the ARC size bounds and that index, lists and ghosts agree.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let (t1, t2, b1, b2) = (self.t1.len(), self.t2.len(), self.b1.len(), self.b2.len());
        let cap = self.capacity;

        ensure_invariant!(
            self.index.len() == t1 + t2,
            "arc index has {} keys but T1 + T2 = {}",
            self.index.len(),
            t1 + t2
        );
        ensure_invariant!(t1 + t2 <= cap, "T1 + T2 ({}) exceeds capacity ({cap})", t1 + t2);
        ensure_invariant!(t1 + b1 <= cap, "T1 + B1 ({}) exceeds capacity ({cap})", t1 + b1);
        ensure_invariant!(
            t2 + b2 <= 2 * cap,
            "T2 + B2 ({}) exceeds twice the capacity ({cap})",
            t2 + b2
        );
        ensure_invariant!(
            t1 + t2 + b1 + b2 <= 2 * cap,
            "ARC tracks {} keys, more than twice the capacity ({cap})",
            t1 + t2 + b1 + b2
        );
        ensure_invariant!(
            self.target_t1 <= cap,
            "target_t1 ({}) exceeds capacity ({cap})",
            self.target_t1
        );
        self.b1.check_invariants()?;
        self.b2.check_invariants()?;

        let mut in_t1 = 0usize;
        for (key, slot) in &self.index {
            ensure_invariant!(
                self.list(slot.list).get(slot.id).is_some_and(|entry| &entry.key == key),
                "arc index entry points at a slot holding another key"
            );
            ensure_invariant!(
                !self.b1.contains(key) && !self.b2.contains(key),
                "resident key is also a ghost"
            );
            if slot.list == ListKind::T1 {
                in_t1 += 1;
            }
        }
        ensure_invariant!(
            in_t1 == t1,
            "index places {in_t1} keys in T1 but T1 holds {t1}"
        );
        for key in self.b1.iter() {
            ensure_invariant!(!self.b2.contains(key), "key is a ghost in both B1 and B2");
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.t1.debug_validate_invariants();
        self.t2.debug_validate_invariants();
        if let Err(err) = self.check_invariants() {
            panic!("{err}");
        }
    }
}

impl<K, V> CachePolicy<K, V> for ArcCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        let Some(&slot) = self.index.get(key) else {
            if self.b1.touch(key) || self.b2.touch(key) {
                #[cfg(feature = "metrics")]
                self.metrics.record_ghost_refresh();
            }
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return None;
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        let id = self.promote(slot)?;
        self.t2.get(id).map(|entry| &entry.value)
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        if self.capacity == 0 {
            return None;
        }

        if let Some(&slot) = self.index.get(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();

            let id = self.promote(slot)?;
            return self
                .t2
                .get_mut(id)
                .map(|entry| std::mem::replace(&mut entry.value, value));
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        if self.b1.contains(&key) {
            self.grow_target();
            self.b1.remove(&key);
            self.make_room(GhostHit::B1);
            self.insert_front(ListKind::T2, key, value);
        } else if self.b2.contains(&key) {
            self.shrink_target();
            self.b2.remove(&key);
            self.make_room(GhostHit::B2);
            self.insert_front(ListKind::T2, key, value);
        } else {
            self.admit_new();
            self.insert_front(ListKind::T1, key, value);
        }

        debug_assert!(self.t1.len() + self.t2.len() <= self.capacity);
        debug_assert!(self.t1.len() + self.b1.len() <= self.capacity);
        None
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_peek_call();

        let slot = self.index.get(key)?;

        #[cfg(feature = "metrics")]
        self.metrics.record_peek_found();
        self.list(slot.list).get(slot.id).map(|entry| &entry.value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        let slot = self.index.remove(key)?;

        #[cfg(feature = "metrics")]
        self.metrics.record_remove();
        self.list_mut(slot.list).remove(slot.id).map(|entry| entry.value)
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

        self.index.clear();
        self.t1.clear();
        self.t2.clear();
        self.b1.clear();
        self.b2.clear();
        self.target_t1 = self.config.initial_target.min(self.capacity);
    }
}

#[cfg(feature = "metrics")]
impl<K, V> ArcCache<K, V>
where
    K: Clone + Eq + Hash,
{
    pub fn metrics_snapshot(&self) -> ArcMetricsSnapshot {
        ArcMetricsSnapshot {
            core: self.metrics.core.snapshot(),
            t1_to_t2_promotions: self.metrics.t1_to_t2_promotions,
            b1_ghost_hits: self.metrics.b1_ghost_hits,
            b2_ghost_hits: self.metrics.b2_ghost_hits,
            ghost_refreshes: self.metrics.ghost_refreshes,
            target_increases: self.metrics.target_increases,
            target_decreases: self.metrics.target_decreases,
            t1_evictions: self.metrics.t1_evictions,
            t2_evictions: self.metrics.t2_evictions,
            ghost_expiries: self.metrics.ghost_expiries,
            cache_len: self.index.len(),
            capacity: self.capacity,
            target_t1: self.target_t1,
            t1_len: self.t1.len(),
            t2_len: self.t2.len(),
            b1_len: self.b1.len(),
            b2_len: self.b2.len(),
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<ArcMetricsSnapshot> for ArcCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn snapshot(&self) -> ArcMetricsSnapshot {
        self.metrics_snapshot()
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: ARC bounds and list disjointness hold for any sequence
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_invariants_always_hold(
            capacity in 0usize..8,
            initial_target in 0usize..8,
            ops in prop::collection::vec((0u8..4, 0u32..24), 0..300)
        ) {
            let mut cache = ArcCache::with_config(capacity, ArcConfig { initial_target });
            for (op, key) in ops {
                match op {
                    0 => { cache.get(&key); }
                    1 | 2 => { cache.put(key, key); }
                    _ => { cache.remove(&key); }
                }
                prop_assert!(cache.len() <= capacity);
                prop_assert!(cache.check_invariants().is_ok());
            }
        }

        /// Property: a put is always immediately readable
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_put_then_get(
            capacity in 1usize..8,
            ops in prop::collection::vec((0u32..24, any::<u16>()), 1..200)
        ) {
            let mut cache = ArcCache::new(capacity);
            for (key, value) in ops {
                cache.put(key, value);
                prop_assert_eq!(cache.get(&key), Some(&value));
            }
        }
    }
}
