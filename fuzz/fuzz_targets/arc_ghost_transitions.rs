#![no_main]

use cacheplex::policy::ArcCache;
use cacheplex::traits::CachePolicy;
use libfuzzer_sys::fuzz_target;

// Read-through traffic over a small key space so keys cycle through
// T1, T2, B1 and B2, checking the ARC bounds after every access.
fuzz_target!(|data: &[u8]| {
    let Some((&first, rest)) = data.split_first() else {
        return;
    };

    let capacity = (first as usize) % 16 + 1;
    let mut cache: ArcCache<u8, u8> = ArcCache::new(capacity);

    for &byte in rest {
        let key = byte % (capacity as u8 * 3 + 1);
        let was_ghost = cache.contains_ghost(&key);

        if cache.get(&key).is_none() {
            let t2_before = cache.t2_len();
            cache.put(key, byte);
            if was_ghost {
                // A ghost hit is admitted straight into T2.
                assert!(cache.t2_len() >= 1);
                assert!(cache.t2_len() + 1 >= t2_before);
            }
        }

        assert!(!cache.contains_ghost(&key));
        assert!(cache.t1_len() + cache.t2_len() <= capacity);
        assert!(cache.t1_len() + cache.b1_len() <= capacity);
        assert!(cache.t2_len() + cache.b2_len() <= 2 * capacity);
        assert!(cache.target_t1_size() <= capacity);
        if let Err(err) = cache.check_invariants() {
            panic!("capacity={capacity}: {err}");
        }
    }
});
