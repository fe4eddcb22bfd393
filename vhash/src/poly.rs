//! Polynomial accumulator over a 127-bit domain.
//!
//! Successive NH outputs are folded into a running accumulator with one
//! `acc * key + msg` step per chunk. The ring behaves like the integers
//! modulo 2^127 - 1, but no full reduction happens inside a step; only a
//! renormalization back into 127 bits plus a guard bit.

use crate::backend::Backend;

/// Mask keeping the low 126 bits of an NH output's high word.
pub(crate) const M62: u64 = 0x3fff_ffff_ffff_ffff;

/// Mask keeping 63 bits; bit 63 of the high limb is the fold-back carry.
pub(crate) const M63: u64 = 0x7fff_ffff_ffff_ffff;

/// Mask applied to each half of the seeded polynomial key. Keeping the
/// key halves this sparse bounds the cross-multiplies below 2^128, so
/// the step never loses carries.
pub(crate) const MPOLY: u64 = 0x1fff_ffff_1fff_ffff;

/// One accumulator fold: `acc * key + msg`, renormalized.
///
/// `key` halves must already be [`MPOLY`]-masked; `msg` is an NH output
/// with its high word [`M62`]-masked.
pub(crate) fn step<B: Backend>(acc: (u64, u64), key: (u64, u64), msg: (u64, u64)) -> (u64, u64) {
    let (a_hi, a_lo) = acc;
    let (k_hi, k_lo) = key;
    let (m_hi, m_lo) = msg;

    // Schoolbook 2x2-limb multiply. 2^128 = 2 (mod 2^127 - 1), so the
    // top partial product enters pre-doubled via `2 * k_hi`.
    let (t1_hi, t1_lo) = B::mul64(a_hi, k_hi.wrapping_mul(2));
    let (t2_hi, t2_lo) = {
        let (hi, lo) = B::mul64(a_hi, k_lo);
        B::fma64(hi, lo, a_lo, k_hi)
    };
    let (hi, lo) = {
        let (hi, lo) = B::mul64(a_lo, k_lo);
        B::add128(hi, lo, t1_hi, t1_lo)
    };

    // Fold the middle product: its low word lands on the high limb, and
    // whatever spills past bit 128 re-enters doubled, together with the
    // bit shifted out of position 127.
    let (hi, carry) = hi.overflowing_add(t2_lo);
    let wrap = t2_hi.wrapping_add(u64::from(carry));
    let wrap = wrap.wrapping_mul(2).wrapping_add(hi >> 63);
    let hi = hi & M63;

    let (hi, lo) = B::add128(hi, lo, m_hi, m_lo);
    B::add128(hi, lo, 0, wrap)
}

#[cfg(test)]
mod tests {
    use super::{step, M62, MPOLY};
    use crate::backend::Selected;

    const P127: u128 = (1 << 127) - 1;

    /// `x * y mod 2^127 - 1` for `y < 2^64`, via limb splitting.
    fn mod_mul(x: u128, y: u64) -> u128 {
        let y = u128::from(y);
        let hi = ((x >> 64) * y) % P127;
        // hi * 2^64: split at bit 63 so both pieces stay in range
        let hi = ((hi >> 63) + ((hi & ((1 << 63) - 1)) << 64)) % P127;
        (hi + ((x & u128::from(u64::MAX)) * y) % P127) % P127
    }

    fn residue(v: (u64, u64)) -> u128 {
        ((u128::from(v.0) << 64) | u128::from(v.1)) % P127
    }

    #[test]
    fn step_matches_ring_arithmetic() {
        let mut acc = (0x0123_4567_89ab_cdefu64, 0xfedc_ba98_7654_3210u64);
        let key = (
            0x1e2d_3c4b_0f0f_0f0f & MPOLY,
            0x0bad_cafe_dead_beef & MPOLY,
        );
        let mut msgs = 0x9e37_79b9_7f4a_7c15u64;
        for _ in 0..64 {
            msgs = msgs.wrapping_mul(0xd134_2543_de82_ef95).wrapping_add(1);
            let msg = (msgs & M62, msgs.rotate_left(17));

            let expect = {
                let a = residue(acc);
                let m = (u128::from(msg.0) << 64) | u128::from(msg.1);
                // a * key = a * k_lo + a * k_hi * 2^64, with the 2^64
                // factor decomposed as (2^64 - 1) + 1; sums are folded
                // pairwise to stay inside u128
                let hi = (mod_mul(mod_mul(a, key.0), u64::MAX) + mod_mul(a, key.0)) % P127;
                ((mod_mul(a, key.1) + hi) % P127 + m) % P127
            };
            acc = step::<Selected>(acc, key, msg);
            assert_eq!(residue(acc), expect);
        }
    }

    #[test]
    fn step_stays_in_guarded_range() {
        // the output high limb is the 63-bit renormalized value plus the
        // message word and fold-back carries, so it keeps a guard bit free
        let key = (MPOLY, MPOLY);
        let acc = step::<Selected>((u64::MAX >> 1, u64::MAX), key, (M62, u64::MAX));
        assert!(acc.0 < (1 << 63) + (1 << 62) + 2);
    }
}
