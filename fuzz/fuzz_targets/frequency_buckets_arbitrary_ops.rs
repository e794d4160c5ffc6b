#![no_main]

use cacheplex::ds::FrequencyBuckets;
use libfuzzer_sys::fuzz_target;

// Arbitrary insert/touch/remove/pop_min/decay sequences on FrequencyBuckets.
fuzz_target!(|data: &[u8]| {
    let mut buckets: FrequencyBuckets<u8> = FrequencyBuckets::new();

    for pair in data.chunks_exact(2) {
        let op = pair[0] % 7;
        let key = pair[1] % 64;

        match op {
            0 => {
                let fresh = !buckets.contains(&key);
                assert_eq!(buckets.insert(key), fresh);
                assert!(buckets.frequency(&key).is_some());
            },
            1 => {
                let before = buckets.frequency(&key);
                let after = buckets.touch(&key);
                assert_eq!(after.is_some(), before.is_some());
                if let (Some(b), Some(a)) = (before, after) {
                    assert!(a >= b);
                }
            },
            2 => {
                buckets.remove(&key);
                assert!(!buckets.contains(&key));
            },
            3 => {
                let min = buckets.min_freq();
                if let Some((victim, freq)) = buckets.pop_min() {
                    assert_eq!(Some(freq), min);
                    assert!(!buckets.contains(&victim));
                }
            },
            4 => {
                let peeked = buckets.peek_min().map(|(k, f)| (*k, f));
                assert_eq!(peeked.map(|(_, f)| f), buckets.min_freq());
            },
            5 => buckets.decay_halve(),
            6 => buckets.decay_with(|f| f.saturating_sub(u64::from(key % 4))),
            _ => unreachable!(),
        }

        if let Err(err) = buckets.check_invariants() {
            panic!("{err}");
        }
        assert!(buckets.iter().all(|(_, f)| f >= 1));
    }
});
