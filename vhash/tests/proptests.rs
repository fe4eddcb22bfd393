//! Property-based tests.

use proptest::{collection::vec, prelude::*};
use vhash::{Vhash, DEFAULT_KEY, P64};

fn messages() -> impl Strategy<Value = Vec<u8>> {
    // spans the no-chunk, partial, full and multi-chunk paths
    vec(any::<u8>(), 0..600)
}

proptest! {
    #[test]
    fn deterministic(key in any::<[u8; 16]>(), msg in messages(), seed in any::<u64>()) {
        let vhash = Vhash::new(&key.into());
        prop_assert_eq!(vhash.hash(&msg, seed), vhash.hash(&msg, seed));
    }

    #[test]
    fn tags_stay_below_the_prime(msg in messages(), seed in any::<u64>()) {
        let vhash = Vhash::new(&DEFAULT_KEY.into());
        prop_assert!(vhash.hash(&msg, seed) < P64);
    }

    #[test]
    fn distinct_seeds_disagree(msg in messages(), s1 in any::<u64>(), s2 in any::<u64>()) {
        prop_assume!(s1 != s2);
        let vhash = Vhash::new(&DEFAULT_KEY.into());
        prop_assert_ne!(vhash.hash(&msg, s1), vhash.hash(&msg, s2));
    }

    #[test]
    fn appended_byte_disagrees(msg in messages(), byte in any::<u8>(), seed in any::<u64>()) {
        let vhash = Vhash::new(&DEFAULT_KEY.into());
        let before = vhash.hash(&msg, seed);
        let mut msg = msg;
        msg.push(byte);
        prop_assert_ne!(before, vhash.hash(&msg, seed));
    }

    /// The byte-swapped variant over the same key context reads message
    /// words in the mirrored order, so lane-reversing a whole-word
    /// message must reproduce the native tag.
    #[test]
    fn endian_symmetry(words in vec(any::<u64>(), 0..80), seed in any::<u64>()) {
        let vhash = Vhash::new(&DEFAULT_KEY.into());
        let native: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        let mirrored: Vec<u8> = words.iter().flat_map(|w| w.to_be_bytes()).collect();
        prop_assert_eq!(vhash.hash(&native, seed), vhash.hash_swapped(&mirrored, seed));
    }

    #[test]
    fn truncated_tag_is_the_low_half(msg in messages(), seed in any::<u64>()) {
        let vhash = Vhash::new(&DEFAULT_KEY.into());
        let tag = vhash.tag(&msg, seed);
        prop_assert_eq!(&vhash.tag32(&msg, seed)[..], &tag[..4]);
        prop_assert_eq!(u64::from_le_bytes(tag), vhash.hash(&msg, seed));
    }

    #[test]
    fn trait_and_inherent_construction_agree(key in any::<[u8; 16]>(), msg in messages()) {
        use vhash::universal_hash::KeyInit;
        let a = Vhash::new(&key.into());
        let b = <Vhash as KeyInit>::new(&key.into());
        prop_assert_eq!(a.hash(&msg, 7u64), b.hash(&msg, 7u64));
    }
}
