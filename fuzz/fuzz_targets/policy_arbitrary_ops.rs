#![no_main]

use cacheplex::builder::{CacheBuilder, PolicyKind};
use cacheplex::traits::CachePolicy;
use libfuzzer_sys::fuzz_target;

// Arbitrary get/put/remove/peek sequences against every engine.
//
// Byte 0 picks the policy, byte 1 the capacity (0-31); the rest are
// (op, key) pairs.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let kind = PolicyKind::ALL[data[0] as usize % PolicyKind::ALL.len()];
    let capacity = (data[1] as usize) % 32;
    let mut cache = CacheBuilder::new(capacity).build::<u8, u32>(kind);

    for (step, pair) in data[2..].chunks_exact(2).enumerate() {
        let op = pair[0] % 6;
        let key = pair[1] % 48;
        let value = step as u32;

        match op {
            0 | 1 => {
                let _ = cache.get(&key);
            },
            2 | 3 => {
                cache.put(key, value);
                if capacity > 0 {
                    assert_eq!(cache.peek(&key), Some(&value));
                } else {
                    assert!(cache.is_empty());
                }
            },
            4 => {
                cache.remove(&key);
                assert!(!cache.contains(&key));
            },
            5 => {
                let peeked = cache.peek(&key).copied();
                assert_eq!(peeked.is_some(), cache.contains(&key));
            },
            _ => unreachable!(),
        }

        assert!(cache.len() <= capacity);
        if let Err(err) = cache.check_invariants() {
            panic!("{kind} capacity={capacity}: {err}");
        }
    }
});
