#![no_main]

use cacheplex::ds::GhostList;
use libfuzzer_sys::fuzz_target;

// Arbitrary record/touch/remove/pop/clear sequences on GhostList.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // First byte picks the capacity (0-50)
    let capacity = (data[0] as usize) % 51;
    let mut ghost: GhostList<u32> = GhostList::new(capacity);

    for pair in data[1..].chunks_exact(2) {
        let op = pair[0] % 6;
        let key = u32::from(pair[1]);

        match op {
            0 => {
                let dropped = ghost.record(key);
                if capacity > 0 {
                    assert!(ghost.contains(&key));
                    assert_ne!(dropped, Some(key));
                }
            },
            1 => {
                ghost.remove(&key);
                assert!(!ghost.contains(&key));
            },
            2 => {
                let was_present = ghost.contains(&key);
                assert_eq!(ghost.touch(&key), was_present);
            },
            3 => {
                let before = ghost.len();
                if let Some(oldest) = ghost.pop_oldest() {
                    assert!(!ghost.contains(&oldest));
                    assert_eq!(ghost.len(), before - 1);
                }
            },
            4 => {
                let _ = ghost.contains(&key);
            },
            5 => {
                ghost.clear();
                assert!(ghost.is_empty());
            },
            _ => unreachable!(),
        }

        assert!(ghost.len() <= ghost.capacity());
        if let Err(err) = ghost.check_invariants() {
            panic!("{err}");
        }
        if capacity == 0 {
            assert!(ghost.is_empty());
        }
    }
});
