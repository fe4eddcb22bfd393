//! **VHASH**: a keyed 64-bit universal hash from the VMAC family.
//!
//! The construction compresses 128-byte chunks of the message with the
//! NH universal hash, folds the chunk hashes into a polynomial
//! accumulator over a 127-bit domain, and finishes with an inner-product
//! step modulo the prime 2^64 - 257. All key material is derived from a
//! 128-bit user key by encrypting domain-separated counter blocks with
//! AES-128; the context is immutable afterwards and may be shared freely
//! across threads.
//!
//! A per-call 64-bit [`Seed`] perturbs the polynomial key (XOR with a
//! rotated copy, before masking), so one key context serves many
//! independent logical keys. This seeding is an extension beyond the
//! original published construction; seed zero reproduces the unseeded
//! polynomial key.
//!
//! Every multi-byte access is defined in terms of byte order, never
//! native integer layout, so output is identical on either endianness.
//! The `*_swapped` entry points mirror each load and store for
//! cross-endian verification; [`selftest`] checks both pipelines against
//! the canonical corpus constants.
//!
//! Hashing reads exactly the `msg.len()` input bytes: a final partial
//! chunk is copied into a zeroed buffer rather than read past in place.
//!
//! # Usage
//!
//! ```
//! use vhash::Vhash;
//!
//! let vhash = Vhash::new(&vhash::DEFAULT_KEY.into());
//! let tag = vhash.hash(b"hello", 0u64);
//! assert_eq!(tag, vhash.hash(b"hello", 0u64));
//! assert_ne!(tag, vhash.hash(b"hello", 1u64));
//! ```
//!
//! VHASH on its own is a universal hash, not a full MAC: without the
//! cipher-generated pad of VMAC, tags must not be exposed to parties who
//! could choose messages adaptively.

#![no_std]
#![warn(rust_2018_idioms)]

pub use universal_hash;

use universal_hash::{consts::U16, crypto_common::KeySizeUser, KeyInit};

mod backend;
mod key_schedule;
mod l3;
mod poly;

use backend::{Backend, Selected};
use key_schedule::KeyContext;
use poly::{M62, MPOLY};

/// Size of a VHASH user key in bytes.
pub const KEY_SIZE: usize = 16;

/// Bytes compressed per NH chunk.
pub const NH_BYTES: usize = 128;

/// Width of the full tag in bits.
pub const TAG_BITS: usize = 64;

/// The prime modulus of the finalizer, 2^64 - 257. Every tag is a fully
/// reduced residue below this value.
pub const P64: u64 = key_schedule::P64;

/// Fixed user key for the canonical test-vector corpus.
pub const DEFAULT_KEY: [u8; KEY_SIZE] = *b"abcdefghijklmnop";

/// VHASH user keys (16 bytes).
pub type Key = universal_hash::Key<Vhash>;

/// Expected corpus verification value, native byte order.
const VERIFY_NATIVE: u32 = 0x27c9_cd9d;

/// Expected corpus verification value, byte-swapped pipeline.
const VERIFY_SWAPPED: u32 = 0x6ed6_28ca;

/// A per-call seed.
///
/// Conversion from an external seed value is the seed-preparation step:
/// narrower seeds widen into the internal 64-bit perturbation value.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Seed(u64);

impl From<u64> for Seed {
    fn from(seed: u64) -> Self {
        Seed(seed)
    }
}

impl From<u32> for Seed {
    fn from(seed: u32) -> Self {
        Seed(seed.into())
    }
}

/// The VHASH keyed hash.
///
/// Holds the derived key material. Construction is the only mutation
/// that ever happens; afterwards any number of threads may hash through
/// a shared reference concurrently.
#[derive(Clone)]
pub struct Vhash {
    keys: KeyContext,
}

impl Vhash {
    /// Derive the key context from `key`, splitting cipher output words
    /// in the native (big-endian) order.
    #[must_use]
    pub fn new(key: &Key) -> Self {
        Self {
            keys: KeyContext::derive::<false>(&(*key).into()),
        }
    }

    /// Derive the key context with the mirrored word split, for running
    /// the byte-swapped pipeline end to end.
    #[must_use]
    pub fn new_swapped(key: &Key) -> Self {
        Self {
            keys: KeyContext::derive::<true>(&(*key).into()),
        }
    }

    /// Hash `msg` under `seed` into a 64-bit tag.
    pub fn hash(&self, msg: &[u8], seed: impl Into<Seed>) -> u64 {
        vhash::<Selected, false>(&self.keys, msg, seed.into().0)
    }

    /// Byte-swapped variant of [`Vhash::hash`]: every message word is
    /// loaded in the mirrored order.
    pub fn hash_swapped(&self, msg: &[u8], seed: impl Into<Seed>) -> u64 {
        vhash::<Selected, true>(&self.keys, msg, seed.into().0)
    }

    /// Full 64-bit tag, serialized little-endian.
    pub fn tag(&self, msg: &[u8], seed: impl Into<Seed>) -> [u8; 8] {
        self.hash(msg, seed).to_le_bytes()
    }

    /// Full 64-bit tag of the byte-swapped variant, serialized
    /// big-endian (the endian-mirrored image of [`Vhash::tag`]).
    pub fn tag_swapped(&self, msg: &[u8], seed: impl Into<Seed>) -> [u8; 8] {
        self.hash_swapped(msg, seed).to_be_bytes()
    }

    /// Truncated 32-bit tag: the low half of the full tag,
    /// serialized little-endian.
    pub fn tag32(&self, msg: &[u8], seed: impl Into<Seed>) -> [u8; 4] {
        (self.hash(msg, seed) as u32).to_le_bytes()
    }

    /// Truncated 32-bit tag of the byte-swapped variant.
    pub fn tag32_swapped(&self, msg: &[u8], seed: impl Into<Seed>) -> [u8; 4] {
        (self.hash_swapped(msg, seed) as u32).to_be_bytes()
    }
}

impl KeySizeUser for Vhash {
    type KeySize = U16;
}

impl KeyInit for Vhash {
    fn new(key: &Key) -> Self {
        Self::new(key)
    }
}

impl core::fmt::Debug for Vhash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Vhash").finish_non_exhaustive()
    }
}

/// Check both pipelines against the canonical corpus constants.
///
/// Hashes every prefix of the byte sequence `0, 1, .., 254` under a
/// length-dependent seed, then hashes the concatenated tags; the low 32
/// bits must match the fixed constants for the native and the
/// byte-swapped pipeline. Intended as a startup self-test.
#[must_use]
pub fn selftest() -> bool {
    let native = Vhash::new(&DEFAULT_KEY.into());
    let swapped = Vhash::new_swapped(&DEFAULT_KEY.into());
    verification::<false>(&native) == VERIFY_NATIVE
        && verification::<true>(&swapped) == VERIFY_SWAPPED
}

fn verification<const SWAP: bool>(vhash: &Vhash) -> u32 {
    let mut msg = [0u8; 255];
    for (i, byte) in msg.iter_mut().enumerate() {
        *byte = i as u8;
    }

    let mut corpus = [0u8; 256 * 8];
    for i in 0..256 {
        let tag = self::vhash::<Selected, SWAP>(&vhash.keys, &msg[..i], i as u64);
        let tag = if SWAP {
            tag.to_be_bytes()
        } else {
            tag.to_le_bytes()
        };
        corpus[8 * i..8 * (i + 1)].copy_from_slice(&tag);
    }
    self::vhash::<Selected, SWAP>(&vhash.keys, &corpus, 0) as u32
}

/// Mask the polynomial key after perturbing it with the rotated seed.
fn seeded_poly_key(polykey: [u64; 2], seed: u64) -> (u64, u64) {
    (
        (polykey[0] ^ seed) & MPOLY,
        (polykey[1] ^ seed.rotate_left(16)) & MPOLY,
    )
}

/// The full construction: chunk, NH, polynomial fold, finalize.
///
/// A pure function of its arguments; each distinct message length
/// follows one of three paths (no chunk, a single possibly-partial
/// chunk, or full chunks followed by an optional partial one).
fn vhash<B: Backend, const SWAP: bool>(keys: &KeyContext, msg: &[u8], seed: u64) -> u64 {
    let key = seeded_poly_key(keys.polykey, seed);
    let nhkey = &keys.nhkey[..NH_BYTES / 8];

    let whole = msg.len() / NH_BYTES * NH_BYTES;
    let rem = msg.len() - whole;
    let (head, tail) = msg.split_at(whole);
    let mut blocks = head.chunks_exact(NH_BYTES);

    let mut acc = match blocks.next() {
        // the first chunk has no prior accumulator to fold: the chunk
        // hash and the polynomial key are simply added
        Some(first) => {
            let (hi, lo) = B::nh::<SWAP>(first, nhkey);
            B::add128(hi & M62, lo, key.0, key.1)
        }
        None if rem != 0 => {
            let (hi, lo) = nh_partial::<B, SWAP>(tail, nhkey);
            B::add128(hi & M62, lo, key.0, key.1)
        }
        // empty message: the finalizer is seeded from the key alone
        None => key,
    };

    for block in blocks {
        let (hi, lo) = B::nh::<SWAP>(block, nhkey);
        acc = poly::step::<B>(acc, key, (hi & M62, lo));
    }
    if whole != 0 && rem != 0 {
        let (hi, lo) = nh_partial::<B, SWAP>(tail, nhkey);
        acc = poly::step::<B>(acc, key, (hi & M62, lo));
    }

    l3::l3hash::<B>(acc, keys.l3key, (rem * 8) as u64)
}

/// NH over the final partial chunk, zero-padded to a 16-byte boundary.
/// Only the logical input range is read.
fn nh_partial<B: Backend, const SWAP: bool>(tail: &[u8], nhkey: &[u64]) -> (u64, u64) {
    debug_assert!(!tail.is_empty() && tail.len() < NH_BYTES);
    let mut padded = [0u8; NH_BYTES];
    padded[..tail.len()].copy_from_slice(tail);
    let take = (tail.len() + 15) / 16 * 16;
    B::nh::<SWAP>(&padded[..take], nhkey)
}
