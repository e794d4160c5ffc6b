//! Bounded recency list of keys without values.
//!
//! ARC keeps two of these (B1 and B2) to remember keys it recently evicted.
//! A later request for a remembered key is evidence that the list it was
//! evicted from deserved more room.
//!
//! ```text
//!   record(k):  k present  → move to front
//!               k absent   → push front; if len > capacity, drop back
//!
//!   front (newest) ─► [k4] ◄──► [k3] ◄──► [k1] ◄── back (oldest)
//! ```
//!
//! All operations are O(1). A capacity of zero makes `record` a no-op.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::intrusive_list::IntrusiveList;
use crate::ds::slot_arena::SlotId;
use crate::error::{InvariantError, ensure_invariant};

/// Key-only LRU list bounded by `capacity`.
#[derive(Debug)]
pub struct GhostList<K> {
    list: IntrusiveList<K>,
    index: FxHashMap<K, SlotId>,
    capacity: usize,
}

impl<K> GhostList<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty ghost list holding at most `capacity` keys.
    pub fn new(capacity: usize) -> Self {
        Self {
            list: IntrusiveList::with_capacity(capacity),
            index: FxHashMap::default(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Remembers `key` as the newest ghost.
    ///
    /// Returns the key that fell off the back, if the list was full.
    pub fn record(&mut self, key: K) -> Option<K> {
        if self.capacity == 0 {
            return None;
        }

        if let Some(&id) = self.index.get(&key) {
            self.list.move_to_front(id);
            return None;
        }

        let mut dropped = None;
        if self.list.len() >= self.capacity {
            dropped = self.pop_oldest();
        }

        let id = self.list.push_front(key.clone());
        self.index.insert(key, id);
        dropped
    }

    /// Moves an existing ghost to the front; returns `false` if absent.
    pub fn touch(&mut self, key: &K) -> bool {
        match self.index.get(key) {
            Some(&id) => self.list.move_to_front(id),
            None => false,
        }
    }

    /// Forgets `key`; returns `true` if it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.index.remove(key) {
            Some(id) => {
                self.list.remove(id);
                true
            },
            None => false,
        }
    }

    /// Drops and returns the oldest ghost.
    pub fn pop_oldest(&mut self) -> Option<K> {
        let key = self.list.pop_back()?;
        self.index.remove(&key);
        Some(key)
    }

    pub fn clear(&mut self) {
        self.list.clear();
        self.index.clear();
    }

    /// Iterates ghosts from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.list.iter()
    }

    /// Checks that the list and its index agree and the bound holds.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        ensure_invariant!(
            self.list.len() == self.index.len(),
            "ghost list has {} nodes but index has {} keys",
            self.list.len(),
            self.index.len()
        );
        ensure_invariant!(
            self.list.len() <= self.capacity,
            "ghost list length ({}) exceeds capacity ({})",
            self.list.len(),
            self.capacity
        );
        for (key, &id) in &self.index {
            ensure_invariant!(
                self.list.get(id) == Some(key),
                "ghost index points at slot {} holding a different key",
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

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(ghost: &GhostList<&'static str>) -> Vec<&'static str> {
        ghost.iter().copied().collect()
    }

    #[test]
    fn ghost_list_records_and_evicts_oldest() {
        let mut ghost = GhostList::new(2);
        assert_eq!(ghost.record("a"), None);
        assert_eq!(ghost.record("b"), None);
        assert_eq!(ghost.record("c"), Some("a"));

        assert!(!ghost.contains(&"a"));
        assert!(ghost.contains(&"b"));
        assert!(ghost.contains(&"c"));
        assert_eq!(ghost.len(), 2);
        ghost.debug_validate_invariants();
    }

    #[test]
    fn ghost_list_record_existing_refreshes() {
        let mut ghost = GhostList::new(2);
        ghost.record("a");
        ghost.record("b");
        assert_eq!(ghost.record("a"), None);
        assert_eq!(keys(&ghost), vec!["a", "b"]);

        assert_eq!(ghost.record("c"), Some("b"));
        assert_eq!(keys(&ghost), vec!["c", "a"]);
        ghost.debug_validate_invariants();
    }

    #[test]
    fn ghost_list_touch_and_remove() {
        let mut ghost = GhostList::new(3);
        ghost.record("a");
        ghost.record("b");
        ghost.record("c");

        assert!(ghost.touch(&"a"));
        assert!(!ghost.touch(&"z"));
        assert_eq!(keys(&ghost), vec!["a", "c", "b"]);

        assert!(ghost.remove(&"c"));
        assert!(!ghost.remove(&"c"));
        assert_eq!(ghost.pop_oldest(), Some("b"));
        assert_eq!(keys(&ghost), vec!["a"]);
        ghost.debug_validate_invariants();
    }

    #[test]
    fn ghost_list_zero_capacity_is_noop() {
        let mut ghost = GhostList::new(0);
        assert_eq!(ghost.record("a"), None);
        assert!(ghost.is_empty());
        assert!(!ghost.contains(&"a"));
        assert_eq!(ghost.pop_oldest(), None);
        ghost.debug_validate_invariants();
    }

    #[test]
    fn ghost_list_clear_empties() {
        let mut ghost = GhostList::new(4);
        ghost.record(1);
        ghost.record(2);
        ghost.clear();
        assert!(ghost.is_empty());
        assert!(!ghost.contains(&1));
        assert_eq!(ghost.capacity(), 4);
    }
}
