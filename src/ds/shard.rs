//! Key-to-shard mapping for [`ShardedCache`](crate::concurrent::ShardedCache).
//!
//! A key is hashed together with a per-cache seed and reduced modulo the shard
//! count. The mapping is stable for the lifetime of the selector, which is all
//! a sharded cache needs: a key always lands in the same engine.
//!
//! ```
//! use cacheplex::ds::ShardSelector;
//!
//! let selector = ShardSelector::new(4, 7);
//! let shard = selector.shard_for_key(&"user:42");
//! assert!(shard < 4);
//! assert_eq!(selector.shard_for_key(&"user:42"), shard);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Deterministic seeded shard selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSelector {
    shards: usize,
    seed: u64,
}

impl ShardSelector {
    /// Creates a selector over `shards` shards; zero is clamped to one.
    pub fn new(shards: usize, seed: u64) -> Self {
        Self {
            shards: shards.max(1),
            seed,
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards
    }

    /// Maps `key` into `[0, shard_count)`.
    pub fn shard_for_key<K: Hash + ?Sized>(&self, key: &K) -> usize {
        if self.shards == 1 {
            return 0;
        }
        let mut hasher = DefaultHasher::new();
        hasher.write_u64(self.seed);
        key.hash(&mut hasher);
        (hasher.finish() % self.shards as u64) as usize
    }
}

impl Default for ShardSelector {
    fn default() -> Self {
        Self::new(1, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shard_selector_is_deterministic() {
        let selector = ShardSelector::new(8, 123);
        let a = selector.shard_for_key(&"key");
        assert_eq!(selector.shard_for_key(&"key"), a);
        assert!(a < selector.shard_count());
    }

    #[test]
    fn shard_selector_zero_shards_clamps_to_one() {
        let selector = ShardSelector::new(0, 9);
        assert_eq!(selector.shard_count(), 1);
        assert_eq!(selector.shard_for_key(&1234u64), 0);
        assert_eq!(ShardSelector::default().shard_count(), 1);
    }

    #[test]
    fn shard_selector_uses_every_shard() {
        let selector = ShardSelector::new(4, 0);
        let mut hits = [0usize; 4];
        for key in 0..1_000u64 {
            hits[selector.shard_for_key(&key)] += 1;
        }
        assert!(hits.iter().all(|&n| n > 100), "skewed distribution: {hits:?}");
    }
}
