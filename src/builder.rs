//! Runtime policy selection.
//!
//! [`CacheBuilder`] picks an engine from a [`PolicyKind`] value, so a harness
//! can iterate over policies without naming concrete types. The returned
//! [`Cache`] implements [`CachePolicy`] by forwarding to the engine inside.
//!
//! ## Example
//!
//! ```rust
//! use cacheplex::builder::{CacheBuilder, PolicyKind};
//! use cacheplex::traits::CachePolicy;
//!
//! for kind in PolicyKind::ALL {
//!     let mut cache = CacheBuilder::new(100).build::<u64, String>(kind);
//!     cache.put(1, "hello".to_string());
//!     assert_eq!(cache.get(&1), Some(&"hello".to_string()));
//! }
//! ```

use std::fmt;
use std::hash::Hash;

use crate::error::{ConfigError, InvariantError};
use crate::policy::arc::{ArcCache, ArcConfig};
use crate::policy::lfu::{LfuCache, LfuConfig};
use crate::policy::lru::LruCache;
use crate::traits::CachePolicy;

/// Available eviction policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    /// Least Recently Used.
    Lru,
    /// Least Frequently Used, with aging.
    Lfu,
    /// Adaptive Replacement Cache.
    Arc,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 3] = [PolicyKind::Lru, PolicyKind::Lfu, PolicyKind::Arc];

    pub fn name(self) -> &'static str {
        match self {
            PolicyKind::Lru => "LRU",
            PolicyKind::Lfu => "LFU",
            PolicyKind::Arc => "ARC",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cache whose policy was chosen at runtime.
#[derive(Debug)]
pub struct Cache<K, V> {
    inner: CacheInner<K, V>,
}

#[derive(Debug)]
enum CacheInner<K, V> {
    Lru(LruCache<K, V>),
    Lfu(LfuCache<K, V>),
    Arc(ArcCache<K, V>),
}

impl<K, V> Cache<K, V>
where
    K: Clone + Eq + Hash,
{
    pub fn policy(&self) -> PolicyKind {
        match &self.inner {
            CacheInner::Lru(_) => PolicyKind::Lru,
            CacheInner::Lfu(_) => PolicyKind::Lfu,
            CacheInner::Arc(_) => PolicyKind::Arc,
        }
    }

    /// Runs the wrapped engine's invariant check.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        match &self.inner {
            CacheInner::Lru(lru) => lru.check_invariants(),
            CacheInner::Lfu(lfu) => lfu.check_invariants(),
            CacheInner::Arc(arc) => arc.check_invariants(),
        }
    }

    fn engine(&self) -> &dyn CachePolicy<K, V> {
        match &self.inner {
            CacheInner::Lru(lru) => lru,
            CacheInner::Lfu(lfu) => lfu,
            CacheInner::Arc(arc) => arc,
        }
    }

    fn engine_mut(&mut self) -> &mut dyn CachePolicy<K, V> {
        match &mut self.inner {
            CacheInner::Lru(lru) => lru,
            CacheInner::Lfu(lfu) => lfu,
            CacheInner::Arc(arc) => arc,
        }
    }
}

impl<K, V> CachePolicy<K, V> for Cache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        self.engine_mut().get(key)
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        self.engine_mut().put(key, value)
    }

    fn contains(&self, key: &K) -> bool {
        self.engine().contains(key)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        self.engine().peek(key)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        self.engine_mut().remove(key)
    }

    fn len(&self) -> usize {
        self.engine().len()
    }

    fn capacity(&self) -> usize {
        self.engine().capacity()
    }

    fn clear(&mut self) {
        self.engine_mut().clear();
    }
}

/// Builder for [`Cache`] instances.
#[derive(Debug, Clone, Copy)]
pub struct CacheBuilder {
    capacity: usize,
    lfu: LfuConfig,
    arc: ArcConfig,
}

impl CacheBuilder {
    /// Starts a builder for caches holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            lfu: LfuConfig::default(),
            arc: ArcConfig::default(),
        }
    }

    /// Aging settings used when building [`PolicyKind::Lfu`].
    pub fn with_lfu_config(mut self, config: LfuConfig) -> Self {
        self.lfu = config;
        self
    }

    /// Settings used when building [`PolicyKind::Arc`].
    pub fn with_arc_config(mut self, config: ArcConfig) -> Self {
        self.arc = config;
        self
    }

    /// Builds a cache with the given policy.
    ///
    /// # Panics
    ///
    /// Panics if the LFU configuration is invalid and `policy` is
    /// [`PolicyKind::Lfu`]. See [`try_build`](Self::try_build).
    pub fn build<K, V>(self, policy: PolicyKind) -> Cache<K, V>
    where
        K: Clone + Eq + Hash,
    {
        match self.try_build(policy) {
            Ok(cache) => cache,
            Err(err) => panic!("invalid {policy} configuration: {err}"),
        }
    }

    /// Fallible form of [`build`](Self::build).
    pub fn try_build<K, V>(self, policy: PolicyKind) -> Result<Cache<K, V>, ConfigError>
    where
        K: Clone + Eq + Hash,
    {
        let inner = match policy {
            PolicyKind::Lru => CacheInner::Lru(LruCache::new(self.capacity)),
            PolicyKind::Lfu => CacheInner::Lfu(LfuCache::try_with_config(self.capacity, self.lfu)?),
            PolicyKind::Arc => CacheInner::Arc(ArcCache::with_config(self.capacity, self.arc)),
        };
        Ok(Cache { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::lfu::AgingTrigger;

    #[test]
    fn test_all_policies_basic_ops() {
        for policy in PolicyKind::ALL {
            let mut cache = CacheBuilder::new(10).build::<u64, String>(policy);
            assert_eq!(cache.policy(), policy);

            assert_eq!(cache.put(1, "one".to_string()), None);
            assert_eq!(cache.put(2, "two".to_string()), None);

            assert_eq!(cache.get(&1), Some(&"one".to_string()));
            assert_eq!(cache.get(&2), Some(&"two".to_string()));
            assert_eq!(cache.get(&3), None);

            assert!(cache.contains(&1));
            assert!(!cache.contains(&99));
            assert_eq!(cache.peek(&2), Some(&"two".to_string()));

            assert_eq!(cache.len(), 2);
            assert!(!cache.is_empty());
            assert_eq!(cache.capacity(), 10);

            assert_eq!(cache.put(1, "ONE".to_string()), Some("one".to_string()));
            assert_eq!(cache.get(&1), Some(&"ONE".to_string()));

            assert_eq!(cache.remove(&2), Some("two".to_string()));
            assert!(cache.check_invariants().is_ok());

            cache.clear();
            assert!(cache.is_empty());
        }
    }

    #[test]
    fn test_capacity_enforcement() {
        let mut cache = CacheBuilder::new(2).build::<u64, String>(PolicyKind::Lru);

        cache.put(1, "one".to_string());
        cache.put(2, "two".to_string());
        cache.put(3, "three".to_string());

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&1));
        assert!(cache.contains(&2));
        assert!(cache.contains(&3));
    }

    #[test]
    fn test_try_build_rejects_bad_lfu_config() {
        let builder = CacheBuilder::new(8).with_lfu_config(LfuConfig {
            aging: AgingTrigger::Operations { interval: 0 },
            ..LfuConfig::default()
        });
        assert!(builder.try_build::<u8, u8>(PolicyKind::Lfu).is_err());
        // Other policies ignore the LFU settings.
        assert!(builder.try_build::<u8, u8>(PolicyKind::Lru).is_ok());
    }

    #[test]
    fn test_arc_config_is_forwarded() {
        let mut cache = CacheBuilder::new(4)
            .with_arc_config(ArcConfig { initial_target: 2 })
            .build::<u8, u8>(PolicyKind::Arc);
        cache.put(1, 1);
        assert!(cache.check_invariants().is_ok());
    }

    #[test]
    fn test_policy_names() {
        assert_eq!(PolicyKind::Lru.to_string(), "LRU");
        assert_eq!(PolicyKind::Lfu.name(), "LFU");
        assert_eq!(format!("{}", PolicyKind::Arc), "ARC");
    }
}
