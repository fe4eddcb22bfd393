//! Portable arithmetic kernel built on `u128`.

use super::Backend;

/// Reference backend. Always available, and the baseline any accelerated
/// kernel is verified against.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Soft;

impl Backend for Soft {
    #[inline]
    fn mul64(a: u64, b: u64) -> (u64, u64) {
        let wide = u128::from(a) * u128::from(b);
        ((wide >> 64) as u64, wide as u64)
    }

    #[inline]
    fn add128(hi: u64, lo: u64, x_hi: u64, x_lo: u64) -> (u64, u64) {
        let (lo, carry) = lo.overflowing_add(x_lo);
        (hi.wrapping_add(x_hi).wrapping_add(u64::from(carry)), lo)
    }
}
