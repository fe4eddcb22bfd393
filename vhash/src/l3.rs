//! L3 finalizer.
//!
//! Maps the polynomial accumulator plus a length term to a 64-bit tag:
//! the 127-bit value is split into its quotient and remainder modulo
//! 2^64 - 2^32, each half is offset by a key word, and the two halves
//! are multiplied modulo the prime 2^64 - 257. The output is always a
//! fully reduced residue below the prime.

use crate::backend::Backend;
use crate::key_schedule::P64;
use crate::poly::M63;

/// Inner folding modulus, 2^64 - 2^32.
const M6432: u64 = 0xffff_ffff_0000_0000;

/// Reduce `acc` plus `len_bits` into a 64-bit tag below [`P64`].
///
/// `len_bits` is the bit length of the final partial chunk (zero for an
/// empty message or one ending on a chunk boundary).
pub(crate) fn l3hash<B: Backend>(acc: (u64, u64), key: [u64; 2], len_bits: u64) -> u64 {
    let (p1, p2) = acc;

    // Fold acc + (len, 0) fully into the 127-bit range. 2^127 = 1 in
    // this ring, so carries out of bit 127 re-enter at the bottom;
    // a second pass catches the carry produced by the first.
    let t = p1 >> 63;
    let p1 = p1 & M63;
    let (p2, c) = p2.overflowing_add(t);
    let p1 = p1 + u64::from(c) + len_bits;
    let t = u64::from(p1 > M63) + u64::from(p1 == M63 && p2 == u64::MAX);
    let (p2, c) = p2.overflowing_add(t);
    let p1 = p1.wrapping_add(u64::from(c)) & M63;

    // Split the 127-bit value into quotient and remainder modulo
    // 2^64 - 2^32 by folding 2^64 down to 2^32.
    let mut q = p1;
    let (lo, c) = (p1 << 32).overflowing_add(p2);
    let hi = (p1 >> 32) + u64::from(c);
    q += hi;
    let (mut r, mut spill) = (hi << 32).overflowing_add(lo);
    while spill {
        q += 1;
        (r, spill) = r.overflowing_add(1 << 32);
    }
    if r >= M6432 {
        r -= M6432;
        q += 1;
    }

    // Offset each half by its key word. The modulus is 2^64 - 257, so a
    // wrapped addition is corrected by re-adding 257.
    let x = q.wrapping_add(key[0]);
    let x = if x < key[0] { x + 257 } else { x };
    let y = r.wrapping_add(key[1]);
    let y = if y < key[1] { y + 257 } else { y };

    // Multiply the halves and reduce the product via 2^64 = 257
    // (mod 2^64 - 257): the high word re-enters once as itself and once
    // shifted by 8, with the spilled carries folded in at weight 257.
    let (p_hi, p_lo) = B::mul64(x, y);
    let mut t = p_hi >> 56;
    let (lo, c) = p_lo.overflowing_add(p_hi);
    t += u64::from(c);
    let (lo, c) = lo.overflowing_add(p_hi << 8);
    t += u64::from(c);
    let t = t.wrapping_add(t << 8);
    let (mut tag, c) = lo.overflowing_add(t);
    if c {
        tag += 257;
    }
    if tag > P64 - 1 {
        tag = tag.wrapping_add(257);
    }
    tag
}
