//! Frequency buckets for O(1) LFU tracking.
//!
//! Tracks a use count per key and answers "which key has the lowest count,
//! and among those, which was used least recently" in O(1). Values are not
//! stored here; the LFU engine keeps them in its own map.
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<K, SlotId>        entries: SlotArena<Entry<K>>
//!   ┌──────────┬────────┐              ┌──────┬──────────────────────────────┐
//!   │ "page_a" │  id_0  │ ───────────► │ id_0 │ freq 2, last_touch 7, links  │
//!   │ "page_b" │  id_1  │ ───────────► │ id_1 │ freq 1, last_touch 3, links  │
//!   │ "page_c" │  id_2  │ ───────────► │ id_2 │ freq 1, last_touch 5, links  │
//!   └──────────┴────────┘              └──────┴──────────────────────────────┘
//!
//!   buckets: FxHashMap<u64, Bucket>, chained in ascending frequency
//!
//!   min_freq = 1
//!   freq=1: head ──► [id_2] ◄──► [id_1] ◄── tail   (tail is evicted first)
//!              │
//!            next
//!              ▼
//!   freq=2: head ──► [id_0] ◄── tail
//! ```
//!
//! Every insert and touch stamps the entry with a monotonically increasing
//! tick. Within a bucket, ticks strictly decrease from head to tail, so the
//! tail is always the least recently used key at that frequency.
//!
//! ## Operations
//!
//! | Operation      | Time       | Notes                                   |
//! |----------------|------------|-----------------------------------------|
//! | `insert`       | O(1)       | New key starts at freq=1                |
//! | `touch`        | O(1)       | Increment frequency, move to bucket MRU |
//! | `remove`       | O(1)       |                                         |
//! | `pop_min`      | O(1)       | Lowest freq, least recent on ties       |
//! | `decay_halve`  | O(n)       | Merges buckets that collapse together   |
//!
//! A running sum of all frequencies is maintained so callers can compute the
//! average frequency without a scan.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::{InvariantError, ensure_invariant};

#[derive(Debug)]
struct Entry<K> {
    key: K,
    freq: u64,
    last_touch: u64,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    head: Option<SlotId>,
    tail: Option<SlotId>,
    prev: Option<u64>,
    next: Option<u64>,
}

impl Bucket {
    fn empty(prev: Option<u64>, next: Option<u64>) -> Self {
        Self {
            head: None,
            tail: None,
            prev,
            next,
        }
    }
}

/// LFU metadata: per-key frequency with least-recent tie-breaking.
#[derive(Debug)]
pub struct FrequencyBuckets<K> {
    entries: SlotArena<Entry<K>>,
    index: FxHashMap<K, SlotId>,
    buckets: FxHashMap<u64, Bucket>,
    /// Lowest occupied frequency; 0 when empty.
    min_freq: u64,
    total_frequency: u64,
    tick: u64,
}

impl<K> FrequencyBuckets<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: SlotArena::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            buckets: FxHashMap::default(),
            min_freq: 0,
            total_frequency: 0,
            tick: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the current frequency of `key`.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        let id = self.index.get(key)?;
        self.entries.get(*id).map(|entry| entry.freq)
    }

    /// Returns the lowest frequency currently tracked.
    pub fn min_freq(&self) -> Option<u64> {
        if self.is_empty() {
            None
        } else {
            Some(self.min_freq)
        }
    }

    /// Sum of the frequencies of all tracked keys.
    pub fn total_frequency(&self) -> u64 {
        self.total_frequency
    }

    /// Starts tracking `key` at frequency 1.
    ///
    /// Returns `false` (and leaves the entry untouched) if already present.
    pub fn insert(&mut self, key: K) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }

        if !self.buckets.contains_key(&1) {
            let next = (self.min_freq != 0).then_some(self.min_freq);
            if let Some(next) = next
                && let Some(bucket) = self.buckets.get_mut(&next)
            {
                bucket.prev = Some(1);
            }
            self.buckets.insert(1, Bucket::empty(None, next));
        }

        let tick = self.next_tick();
        let id = self.entries.insert(Entry {
            key: key.clone(),
            freq: 1,
            last_touch: tick,
            prev: None,
            next: None,
        });
        self.index.insert(key, id);
        self.list_push_front(1, id);
        self.min_freq = 1;
        self.total_frequency = self.total_frequency.saturating_add(1);
        true
    }

    /// Records one use of `key` and returns its new frequency.
    ///
    /// Frequencies saturate at `u64::MAX`; a saturated key is still moved to
    /// the front of its bucket.
    pub fn touch(&mut self, key: &K) -> Option<u64> {
        let id = *self.index.get(key)?;
        let freq = self.entries.get(id)?.freq;
        let new_freq = freq.saturating_add(1);
        let tick = self.next_tick();

        self.list_remove(freq, id);
        if new_freq != freq {
            self.ensure_bucket_after(new_freq, freq);
        }
        self.list_push_front(new_freq, id);

        if let Some(entry) = self.entries.get_mut(id) {
            entry.freq = new_freq;
            entry.last_touch = tick;
        }

        if new_freq != freq {
            self.total_frequency = self.total_frequency.saturating_add(1);
            if self.bucket_is_empty(freq) {
                self.remove_bucket(freq);
            }
        }
        Some(new_freq)
    }

    /// Stops tracking `key`; returns the frequency it had.
    pub fn remove(&mut self, key: &K) -> Option<u64> {
        let id = self.index.remove(key)?;
        let freq = self.entries.get(id)?.freq;
        self.list_remove(freq, id);
        self.entries.remove(id);
        self.total_frequency = self.total_frequency.saturating_sub(freq);
        if self.bucket_is_empty(freq) {
            self.remove_bucket(freq);
        }
        Some(freq)
    }

    /// Returns the next eviction candidate without removing it.
    pub fn peek_min(&self) -> Option<(&K, u64)> {
        let bucket = self.buckets.get(&self.min_freq)?;
        let entry = self.entries.get(bucket.tail?)?;
        Some((&entry.key, entry.freq))
    }

    /// Removes and returns the lowest-frequency, least recently used key.
    pub fn pop_min(&mut self) -> Option<(K, u64)> {
        let tail = self.buckets.get(&self.min_freq)?.tail?;
        let key = self.entries.get(tail)?.key.clone();
        let freq = self.remove(&key)?;
        Some((key, freq))
    }

    /// Halves every frequency, flooring at 1.
    pub fn decay_halve(&mut self) {
        self.decay_with(|freq| freq / 2);
    }

    /// Rewrites every frequency with `f`, flooring the result at 1.
    ///
    /// `f` must be non-decreasing. The bucket chain is walked in ascending
    /// order and neighbouring buckets that land on the same frequency are
    /// merged by last touch, so keys keep their least-recent-first eviction
    /// order without a global sort.
    pub fn decay_with<F>(&mut self, f: F)
    where
        F: Fn(u64) -> u64,
    {
        let mut groups: Vec<(u64, Vec<SlotId>)> = Vec::new();
        let mut cursor = (self.min_freq != 0).then_some(self.min_freq);

        while let Some(old_freq) = cursor {
            let Some(bucket) = self.buckets.get(&old_freq).copied() else {
                break;
            };
            let ids = self.oldest_first(&bucket);
            let freq = f(old_freq).max(1);

            match groups.last_mut() {
                Some((last, merged)) if *last == freq => {
                    let left = std::mem::take(merged);
                    *merged = self.merge_by_touch(left, ids);
                },
                _ => groups.push((freq, ids)),
            }
            cursor = bucket.next;
        }

        self.buckets.clear();
        self.min_freq = groups.first().map_or(0, |(freq, _)| *freq);
        self.total_frequency = 0;

        let mut below: Option<u64> = None;
        for (freq, ids) in groups {
            if let Some(prev) = below
                && let Some(bucket) = self.buckets.get_mut(&prev)
            {
                bucket.next = Some(freq);
            }
            self.buckets.insert(freq, Bucket::empty(below, None));
            below = Some(freq);

            for id in ids {
                if let Some(entry) = self.entries.get_mut(id) {
                    entry.freq = freq;
                }
                self.list_push_front(freq, id);
                self.total_frequency = self.total_frequency.saturating_add(freq);
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.buckets.clear();
        self.min_freq = 0;
        self.total_frequency = 0;
    }

    /// Iterates `(key, frequency)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> {
        self.entries.iter().map(|(_, entry)| (&entry.key, entry.freq))
    }

    /// Slots of one bucket from tail to head.
    fn oldest_first(&self, bucket: &Bucket) -> Vec<SlotId> {
        let mut ids = Vec::new();
        let mut cursor = bucket.tail;
        while let Some(id) = cursor {
            ids.push(id);
            cursor = self.entries.get(id).and_then(|entry| entry.prev);
        }
        ids
    }

    fn last_touch(&self, id: SlotId) -> u64 {
        self.entries.get(id).map_or(0, |entry| entry.last_touch)
    }

    /// Merges two oldest-first runs into one.
    fn merge_by_touch(&self, left: Vec<SlotId>, right: Vec<SlotId>) -> Vec<SlotId> {
        let mut merged = Vec::with_capacity(left.len() + right.len());
        let mut left = left.into_iter().peekable();
        let mut right = right.into_iter().peekable();
        loop {
            let take_left = match (left.peek(), right.peek()) {
                (Some(&l), Some(&r)) => self.last_touch(l) < self.last_touch(r),
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };
            let next = if take_left { left.next() } else { right.next() };
            merged.extend(next);
        }
        merged
    }

    fn next_tick(&mut self) -> u64 {
        self.tick = self.tick.wrapping_add(1);
        self.tick
    }

    fn bucket_is_empty(&self, freq: u64) -> bool {
        self.buckets
            .get(&freq)
            .is_some_and(|bucket| bucket.head.is_none())
    }

    /// Creates bucket `freq` directly above `anchor` if it does not exist yet.
    fn ensure_bucket_after(&mut self, freq: u64, anchor: u64) {
        if self.buckets.contains_key(&freq) {
            return;
        }
        let next = self.buckets.get(&anchor).and_then(|bucket| bucket.next);
        if let Some(anchor_bucket) = self.buckets.get_mut(&anchor) {
            anchor_bucket.next = Some(freq);
        }
        if let Some(next) = next
            && let Some(next_bucket) = self.buckets.get_mut(&next)
        {
            next_bucket.prev = Some(freq);
        }
        self.buckets.insert(freq, Bucket::empty(Some(anchor), next));
    }

    fn remove_bucket(&mut self, freq: u64) {
        let Some(bucket) = self.buckets.remove(&freq) else {
            return;
        };
        if let Some(prev) = bucket.prev
            && let Some(prev_bucket) = self.buckets.get_mut(&prev)
        {
            prev_bucket.next = bucket.next;
        }
        if let Some(next) = bucket.next
            && let Some(next_bucket) = self.buckets.get_mut(&next)
        {
            next_bucket.prev = bucket.prev;
        }
        if self.min_freq == freq {
            self.min_freq = bucket.next.unwrap_or(0);
        }
    }

    fn list_push_front(&mut self, freq: u64, id: SlotId) {
        let Some(old_head) = self.buckets.get(&freq).map(|bucket| bucket.head) else {
            return;
        };
        if let Some(entry) = self.entries.get_mut(id) {
            entry.prev = None;
            entry.next = old_head;
        }
        if let Some(old_head) = old_head
            && let Some(head_entry) = self.entries.get_mut(old_head)
        {
            head_entry.prev = Some(id);
        }
        if let Some(bucket) = self.buckets.get_mut(&freq) {
            if old_head.is_none() {
                bucket.tail = Some(id);
            }
            bucket.head = Some(id);
        }
    }

    fn list_remove(&mut self, freq: u64, id: SlotId) {
        let Some((prev, next)) = self.entries.get(id).map(|entry| (entry.prev, entry.next)) else {
            return;
        };

        match prev {
            Some(prev_id) => {
                if let Some(prev_entry) = self.entries.get_mut(prev_id) {
                    prev_entry.next = next;
                }
            },
            None => {
                if let Some(bucket) = self.buckets.get_mut(&freq) {
                    bucket.head = next;
                }
            },
        }
        match next {
            Some(next_id) => {
                if let Some(next_entry) = self.entries.get_mut(next_id) {
                    next_entry.prev = prev;
                }
            },
            None => {
                if let Some(bucket) = self.buckets.get_mut(&freq) {
                    bucket.tail = prev;
                }
            },
        }

        if let Some(entry) = self.entries.get_mut(id) {
            entry.prev = None;
            entry.next = None;
        }
    }

    /// Walks every bucket and entry and reports the first inconsistency.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        ensure_invariant!(
            self.index.len() == self.entries.len(),
            "frequency index has {} keys but arena has {} entries",
            self.index.len(),
            self.entries.len()
        );

        if self.is_empty() {
            ensure_invariant!(
                self.buckets.is_empty(),
                "empty tracker still has {} buckets",
                self.buckets.len()
            );
            ensure_invariant!(self.min_freq == 0, "empty tracker has min_freq {}", self.min_freq);
            ensure_invariant!(
                self.total_frequency == 0,
                "empty tracker has total frequency {}",
                self.total_frequency
            );
            return Ok(());
        }

        ensure_invariant!(
            self.buckets.get(&self.min_freq).is_some_and(|b| b.prev.is_none()),
            "min_freq {} is not the lowest bucket",
            self.min_freq
        );

        let mut seen_buckets = 0usize;
        let mut seen_entries = 0usize;
        let mut sum = 0u64;
        let mut prev_freq: Option<u64> = None;
        let mut cursor = Some(self.min_freq);

        while let Some(freq) = cursor {
            let Some(bucket) = self.buckets.get(&freq) else {
                return Err(InvariantError::new(format!("bucket chain points at missing freq {freq}")));
            };
            ensure_invariant!(
                bucket.prev == prev_freq,
                "bucket {freq} has prev {:?}, expected {:?}",
                bucket.prev,
                prev_freq
            );
            ensure_invariant!(
                prev_freq.is_none_or(|p| p < freq),
                "bucket chain is not strictly ascending at {freq}"
            );
            ensure_invariant!(bucket.head.is_some(), "bucket {freq} is empty");

            let mut prev_id: Option<SlotId> = None;
            let mut prev_tick: Option<u64> = None;
            let mut node = bucket.head;
            while let Some(id) = node {
                let Some(entry) = self.entries.get(id) else {
                    return Err(InvariantError::new(format!("bucket {freq} links to freed slot")));
                };
                ensure_invariant!(
                    entry.freq == freq,
                    "entry with freq {} sits in bucket {freq}",
                    entry.freq
                );
                ensure_invariant!(entry.prev == prev_id, "broken back link in bucket {freq}");
                ensure_invariant!(
                    prev_tick.is_none_or(|t| t > entry.last_touch),
                    "bucket {freq} is not ordered most recent first"
                );
                ensure_invariant!(
                    self.index.get(&entry.key) == Some(&id),
                    "index does not point back at entry in bucket {freq}"
                );
                if entry.next.is_none() {
                    ensure_invariant!(bucket.tail == Some(id), "bucket {freq} tail mismatch");
                }
                seen_entries += 1;
                ensure_invariant!(
                    seen_entries <= self.entries.len(),
                    "cycle detected in bucket {freq}"
                );
                sum = sum.saturating_add(entry.freq);
                prev_tick = Some(entry.last_touch);
                prev_id = Some(id);
                node = entry.next;
            }

            seen_buckets += 1;
            prev_freq = Some(freq);
            cursor = bucket.next;
        }

        ensure_invariant!(
            seen_buckets == self.buckets.len(),
            "bucket chain covers {seen_buckets} of {} buckets",
            self.buckets.len()
        );
        ensure_invariant!(
            seen_entries == self.entries.len(),
            "buckets hold {seen_entries} of {} entries",
            self.entries.len()
        );
        ensure_invariant!(
            sum == self.total_frequency,
            "total frequency is {} but entries sum to {sum}",
            self.total_frequency
        );
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("{err}");
        }
    }
}

impl<K> Default for FrequencyBuckets<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_starts_at_one() {
        let mut buckets = FrequencyBuckets::new();
        assert!(buckets.insert("a"));
        assert!(!buckets.insert("a"));
        assert_eq!(buckets.frequency(&"a"), Some(1));
        assert_eq!(buckets.min_freq(), Some(1));
        assert_eq!(buckets.total_frequency(), 1);
        buckets.debug_validate_invariants();
    }

    #[test]
    fn touch_increments_and_moves_bucket() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert("a");
        buckets.insert("b");
        assert_eq!(buckets.touch(&"a"), Some(2));
        assert_eq!(buckets.touch(&"a"), Some(3));
        assert_eq!(buckets.touch(&"missing"), None);

        assert_eq!(buckets.frequency(&"a"), Some(3));
        assert_eq!(buckets.min_freq(), Some(1));
        assert_eq!(buckets.total_frequency(), 4);
        buckets.debug_validate_invariants();

        buckets.remove(&"b");
        assert_eq!(buckets.min_freq(), Some(3));
        buckets.debug_validate_invariants();
    }

    #[test]
    fn pop_min_prefers_least_recent_on_ties() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert("a");
        buckets.insert("b");
        buckets.insert("c");
        buckets.touch(&"a");
        buckets.touch(&"b");
        buckets.touch(&"c");
        // all at freq 2; "a" was touched longest ago
        buckets.touch(&"b");

        assert_eq!(buckets.peek_min(), Some((&"a", 2)));
        assert_eq!(buckets.pop_min(), Some(("a", 2)));
        assert_eq!(buckets.pop_min(), Some(("c", 2)));
        assert_eq!(buckets.pop_min(), Some(("b", 3)));
        assert_eq!(buckets.pop_min(), None);
        buckets.debug_validate_invariants();
    }

    #[test]
    fn touch_fills_gap_between_buckets() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert(1);
        buckets.insert(2);
        for _ in 0..3 {
            buckets.touch(&1);
        }
        // bucket chain is 1 -> 4; touching 2 creates 2 between them
        buckets.touch(&2);
        buckets.debug_validate_invariants();
        assert_eq!(buckets.min_freq(), Some(2));
        assert_eq!(buckets.pop_min(), Some((2, 2)));
        assert_eq!(buckets.pop_min(), Some((1, 4)));
    }

    #[test]
    fn decay_halve_floors_at_one_and_keeps_order() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert("hot");
        for _ in 0..9 {
            buckets.touch(&"hot");
        }
        buckets.insert("old");
        buckets.touch(&"old");
        buckets.insert("new");
        buckets.touch(&"new");

        buckets.decay_halve();
        buckets.debug_validate_invariants();

        assert_eq!(buckets.frequency(&"hot"), Some(5));
        assert_eq!(buckets.frequency(&"old"), Some(1));
        assert_eq!(buckets.frequency(&"new"), Some(1));
        assert_eq!(buckets.total_frequency(), 7);
        assert_eq!(buckets.pop_min(), Some(("old", 1)));
        assert_eq!(buckets.pop_min(), Some(("new", 1)));
    }

    #[test]
    fn decay_with_subtract_merges_buckets() {
        let mut buckets = FrequencyBuckets::new();
        for key in 0..4u32 {
            buckets.insert(key);
            for _ in 0..key {
                buckets.touch(&key);
            }
        }
        // freqs 1, 2, 3, 4
        buckets.decay_with(|f| f.saturating_sub(2));
        buckets.debug_validate_invariants();

        assert_eq!(buckets.frequency(&0), Some(1));
        assert_eq!(buckets.frequency(&1), Some(1));
        assert_eq!(buckets.frequency(&2), Some(1));
        assert_eq!(buckets.frequency(&3), Some(2));
        assert_eq!(buckets.pop_min(), Some((0, 1)));
    }

    #[test]
    fn decay_halve_interleaves_merged_buckets_by_touch() {
        let mut buckets = FrequencyBuckets::new();
        for key in ["a", "b", "c", "d"] {
            buckets.insert(key);
        }
        buckets.touch(&"a");
        buckets.touch(&"b");
        buckets.touch(&"b");
        buckets.touch(&"c");
        buckets.touch(&"d");
        buckets.touch(&"d");
        // freq 2 holds a, c; freq 3 holds b, d; touched in order a, b, c, d

        buckets.decay_halve();
        buckets.debug_validate_invariants();

        let order: Vec<_> = std::iter::from_fn(|| buckets.pop_min()).collect();
        assert_eq!(order, vec![("a", 1), ("b", 1), ("c", 1), ("d", 1)]);
    }

    #[test]
    fn decay_on_empty_is_noop() {
        let mut buckets: FrequencyBuckets<u8> = FrequencyBuckets::new();
        buckets.decay_halve();
        assert!(buckets.is_empty());
        assert_eq!(buckets.min_freq(), None);
        buckets.debug_validate_invariants();
    }

    #[test]
    fn clear_resets_state() {
        let mut buckets = FrequencyBuckets::with_capacity(4);
        buckets.insert("a");
        buckets.touch(&"a");
        buckets.clear();
        assert!(buckets.is_empty());
        assert_eq!(buckets.total_frequency(), 0);
        assert_eq!(buckets.peek_min(), None);
        buckets.debug_validate_invariants();

        buckets.insert("b");
        assert_eq!(buckets.iter().collect::<Vec<_>>(), vec![(&"b", 1)]);
    }
}
