//! Arithmetic backends.
//!
//! Everything above this layer is expressed in terms of the three kernel
//! operations of [`Backend`] plus bitwise masking, so an alternate
//! (e.g. SIMD-accelerated) kernel only has to supply `mul64` and `add128`,
//! optionally overriding the fused [`Backend::nh`] loop. Backends must be
//! bit-identical; a new one is only selected after it reproduces the
//! canonical test-vector corpus.

pub(crate) mod soft;

pub(crate) use soft::Soft as Selected;

/// 64x64 -> 128 multiplication and 128-bit carry arithmetic.
pub(crate) trait Backend {
    /// Exact 128-bit product of two unsigned 64-bit integers as `(hi, lo)`.
    fn mul64(a: u64, b: u64) -> (u64, u64);

    /// 128-bit addition with carry propagated from the low into the high
    /// word, wrapping modulo 2^128. Callers must not rely on a 129th bit.
    fn add128(hi: u64, lo: u64, x_hi: u64, x_lo: u64) -> (u64, u64);

    /// Multiply-accumulate: `(hi, lo) + a * b` modulo 2^128.
    #[inline]
    fn fma64(hi: u64, lo: u64, a: u64, b: u64) -> (u64, u64) {
        let (p_hi, p_lo) = Self::mul64(a, b);
        Self::add128(hi, lo, p_hi, p_lo)
    }

    /// NH compression of one chunk into a 128-bit partial hash.
    ///
    /// `msg.len()` must be a multiple of 16 and no larger than
    /// [`crate::NH_BYTES`]; `key` must hold at least `msg.len() / 8` words.
    /// Word pairs are added to the corresponding key pair and multiplied,
    /// with the products summed in 128 bits. No reduction happens here:
    /// the chunk-size bound keeps the total under 2^128, and the caller
    /// masks the top bits afterwards.
    #[inline]
    fn nh<const SWAP: bool>(msg: &[u8], key: &[u64]) -> (u64, u64) {
        debug_assert_eq!(msg.len() % 16, 0);
        debug_assert!(key.len() * 8 >= msg.len());

        let mut hi = 0;
        let mut lo = 0;
        for (pair, k) in msg.chunks_exact(16).zip(key.chunks_exact(2)) {
            let m0 = read_u64::<SWAP>(&pair[..8]);
            let m1 = read_u64::<SWAP>(&pair[8..]);
            (hi, lo) = Self::fma64(hi, lo, m0.wrapping_add(k[0]), m1.wrapping_add(k[1]));
        }
        (hi, lo)
    }
}

/// Read one message word: little-endian natively, mirrored when `SWAP`.
#[inline]
pub(crate) fn read_u64<const SWAP: bool>(bytes: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(bytes);
    if SWAP {
        u64::from_be_bytes(word)
    } else {
        u64::from_le_bytes(word)
    }
}
