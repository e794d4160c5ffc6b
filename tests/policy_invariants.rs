// ==============================================
// CROSS-POLICY INVARIANT TESTS (integration)
// ==============================================
//
// Behavior every engine must share, exercised through the public trait so
// the three engines are interchangeable in these tests.

use cacheplex::builder::{Cache, CacheBuilder, PolicyKind};
use cacheplex::policy::{ArcCache, LfuCache, LruCache};
use cacheplex::traits::CachePolicy;

fn all_engines(capacity: usize) -> Vec<Cache<u64, u64>> {
    PolicyKind::ALL
        .into_iter()
        .map(|kind| CacheBuilder::new(capacity).build(kind))
        .collect()
}

// ==============================================
// Capacity-0 Behavior
// ==============================================

mod zero_capacity {
    use super::*;

    #[test]
    fn capacity_zero_stores_nothing() {
        for mut cache in all_engines(0) {
            assert_eq!(cache.capacity(), 0);
            for key in 0..10 {
                assert_eq!(cache.put(key, key), None, "{}", cache.policy());
                let policy = cache.policy();
                assert!(cache.get(&key).is_none(), "{policy}");
            }
            assert!(cache.is_empty());
            assert!(cache.check_invariants().is_ok());
        }
    }
}

// ==============================================
// Trait-Level Laws
// ==============================================

mod laws {
    use super::*;

    #[test]
    fn round_trip_through_trait_object() {
        for capacity in [1, 2, 7] {
            for mut cache in all_engines(capacity) {
                let engine: &mut dyn CachePolicy<u64, u64> = &mut cache;
                for key in 0..50 {
                    engine.put(key, key * 3);
                    assert_eq!(engine.get(&key), Some(&(key * 3)));
                }
            }
        }
    }

    #[test]
    fn overwrite_is_idempotent_on_len() {
        for mut cache in all_engines(4) {
            cache.put(1, 10);
            cache.put(2, 20);
            let before = cache.len();
            assert_eq!(cache.put(1, 11), Some(10));
            assert_eq!(cache.len(), before);
            assert_eq!(cache.get(&1), Some(&11));
        }
    }

    #[test]
    fn read_only_calls_do_not_reorder() {
        // peek/contains on the eviction candidate must not save it.
        for mut cache in all_engines(2) {
            cache.put(1, 1);
            cache.put(2, 2);
            assert!(cache.contains(&1));
            assert_eq!(cache.peek(&1), Some(&1));
            cache.put(3, 3);
            assert!(!cache.contains(&1), "{} kept a peeked key", cache.policy());
        }
    }

    #[test]
    fn remove_then_reinsert() {
        for mut cache in all_engines(3) {
            cache.put(1, 1);
            assert_eq!(cache.remove(&1), Some(1));
            assert_eq!(cache.remove(&1), None);
            assert!(!cache.contains(&1));
            cache.put(1, 2);
            assert_eq!(cache.get(&1), Some(&2));
            assert!(cache.check_invariants().is_ok());
        }
    }
}

// ==============================================
// Policy-Specific Eviction Laws
// ==============================================

mod eviction_laws {
    use super::*;

    #[test]
    fn lru_recency_law() {
        let capacity = 5u64;
        let mut cache = LruCache::new(capacity as usize);
        for key in 1..=capacity + 1 {
            cache.put(key, key);
        }
        assert!(!cache.contains(&1));
        for key in 2..=capacity + 1 {
            assert!(cache.contains(&key));
        }

        cache.get(&2);
        cache.put(100, 100);
        assert!(cache.contains(&2));
        assert!(!cache.contains(&3));
    }

    #[test]
    fn lfu_frequency_law() {
        let mut cache = LfuCache::new(3);
        cache.put("A", 1);
        cache.put("B", 2);
        cache.put("C", 3);
        for _ in 0..5 {
            cache.get(&"A");
        }
        for _ in 0..2 {
            cache.get(&"B");
        }

        cache.put("D", 4);
        assert!(!cache.contains(&"C"));
        assert!(cache.contains(&"A"));
        assert!(cache.contains(&"B"));
        assert!(cache.contains(&"D"));
    }

    #[test]
    fn arc_second_touch_survives_one_time_keys() {
        let mut cache = ArcCache::new(4);
        cache.put(1, 1);
        cache.get(&1);
        for key in 10..20 {
            cache.put(key, key);
        }
        assert!(cache.contains(&1));
        assert_eq!(cache.t2_len(), 1);
        assert!(cache.check_invariants().is_ok());
    }

    #[test]
    fn arc_ghost_hit_resurrects_into_t2() {
        let mut cache = ArcCache::new(2);
        cache.put(1, 1);
        cache.get(&1);
        cache.put(2, 2);
        cache.put(3, 3);
        // 2 was the only T1 entry when room was needed.
        assert!(cache.contains_ghost(&2));

        cache.put(2, 20);
        assert!(!cache.contains_ghost(&2));
        assert_eq!(cache.peek(&2), Some(&20));
        assert_eq!(cache.target_t1_size(), 1);
        assert!(cache.check_invariants().is_ok());
    }
}

// ==============================================
// Randomized Stress
// ==============================================

mod stress {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    #[test]
    fn random_ops_keep_invariants() {
        for capacity in [1usize, 3, 16, 64] {
            for mut cache in all_engines(capacity) {
                let mut rng = StdRng::seed_from_u64(0xC0FFEE + capacity as u64);
                let universe = (capacity as u64) * 4;
                for step in 0..5_000u64 {
                    let key = rng.random_range(0..universe);
                    match rng.random_range(0..10u8) {
                        0..=4 => {
                            cache.get(&key);
                        },
                        5..=8 => {
                            cache.put(key, step);
                            assert_eq!(cache.peek(&key), Some(&step));
                        },
                        _ => {
                            cache.remove(&key);
                            assert!(!cache.contains(&key));
                        },
                    }
                    assert!(cache.len() <= capacity);
                    if let Err(err) = cache.check_invariants() {
                        panic!("{} cap={capacity} step={step}: {err}", cache.policy());
                    }
                }
            }
        }
    }

    #[test]
    fn arc_partitions_stay_bounded() {
        let capacity = 32;
        let mut cache = ArcCache::new(capacity);
        let mut rng = StdRng::seed_from_u64(7);
        for step in 0..20_000u64 {
            // Skewed keys so both ghost lists see hits.
            let key = if rng.random_bool(0.6) {
                rng.random_range(0..48u64)
            } else {
                rng.random_range(0..1_000u64)
            };
            if cache.get(&key).is_none() {
                cache.put(key, step);
            }
            assert!(cache.t1_len() + cache.t2_len() <= capacity);
            assert!(cache.t1_len() + cache.b1_len() <= capacity);
            assert!(cache.t2_len() + cache.b2_len() <= 2 * capacity);
            assert!(cache.target_t1_size() <= capacity);
        }
        assert!(cache.check_invariants().is_ok());
    }
}

// ==============================================
// Property Tests
// ==============================================

mod property_tests {
    use proptest::prelude::*;

    use super::*;

    #[derive(Debug, Clone)]
    enum Op {
        Get(u8),
        Put(u8, u16),
        Remove(u8),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => any::<u8>().prop_map(|k| Op::Get(k % 32)),
            4 => (any::<u8>(), any::<u16>()).prop_map(|(k, v)| Op::Put(k % 32, v)),
            1 => any::<u8>().prop_map(|k| Op::Remove(k % 32)),
        ]
    }

    proptest! {
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_resident_values_are_latest_puts(
            capacity in 0usize..12,
            ops in prop::collection::vec(op_strategy(), 0..200)
        ) {
            for kind in PolicyKind::ALL {
                let mut cache: Cache<u8, u16> = CacheBuilder::new(capacity).build(kind);
                let mut latest = std::collections::HashMap::new();

                for op in &ops {
                    match *op {
                        Op::Get(k) => {
                            let got = cache.get(&k).copied();
                            if let Some(v) = got {
                                prop_assert_eq!(Some(&v), latest.get(&k));
                            }
                        },
                        Op::Put(k, v) => {
                            cache.put(k, v);
                            latest.insert(k, v);
                        },
                        Op::Remove(k) => {
                            cache.remove(&k);
                            latest.remove(&k);
                        },
                    }
                    prop_assert!(cache.len() <= capacity);
                    prop_assert!(cache.check_invariants().is_ok());
                }
            }
        }
    }
}
