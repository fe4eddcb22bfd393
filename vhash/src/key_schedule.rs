//! Key derivation.
//!
//! A 128-bit user key is expanded into three pseudorandom key regions by
//! encrypting counter blocks under the block cipher. Each region is
//! domain-separated by a fixed leading byte; the trailing byte of the
//! block is an incrementing counter. Every 16-byte ciphertext yields a
//! pair of 64-bit words, split big-endian natively (mirrored when `SWAP`
//! so a byte-swapped pipeline can be verified end to end).

use aes::Aes128;
use cipher::{consts::U16, BlockEncrypt, BlockSizeUser, KeyInit};

use crate::NH_BYTES;

/// 64-bit words of NH key material: one full chunk's worth plus two
/// extra lanes reserved for the wider tag configurations.
pub(crate) const NH_KEY_WORDS: usize = NH_BYTES / 8 + 2;

/// The L3 prime modulus, 2^64 - 257.
pub(crate) const P64: u64 = 0xffff_ffff_ffff_feff;

/// Domain-separation bytes, one per key region.
const NH_DOMAIN: u8 = 0x80;
const POLY_DOMAIN: u8 = 0xc0;
const L3_DOMAIN: u8 = 0xe0;

/// Immutable key material shared read-only by every hash call.
///
/// `l3key` words are always below [`P64`]; `nhkey` and `polykey` carry
/// no range invariant until masked at use.
#[derive(Clone)]
pub(crate) struct KeyContext {
    pub(crate) nhkey: [u64; NH_KEY_WORDS],
    pub(crate) polykey: [u64; 2],
    pub(crate) l3key: [u64; 2],
}

impl KeyContext {
    /// Expand `key` into the three key regions.
    pub(crate) fn derive<const SWAP: bool>(key: &[u8; 16]) -> Self {
        let cipher = Aes128::new(key.into());
        Self::derive_with::<_, SWAP>(&cipher)
    }

    fn derive_with<C, const SWAP: bool>(cipher: &C) -> Self
    where
        C: BlockEncrypt + BlockSizeUser<BlockSize = U16>,
    {
        let mut nhkey = [0u64; NH_KEY_WORDS];
        let mut counter = counter_block(NH_DOMAIN);
        for pair in nhkey.chunks_exact_mut(2) {
            let (a, b) = next_pair::<C, SWAP>(cipher, &mut counter);
            pair[0] = a;
            pair[1] = b;
        }

        let mut counter = counter_block(POLY_DOMAIN);
        let (a, b) = next_pair::<C, SWAP>(cipher, &mut counter);
        let polykey = [a, b];

        // Rejection sampling: regenerate until both words are usable as
        // residues modulo the prime. Expected retries are ~257/2^64.
        let mut counter = counter_block(L3_DOMAIN);
        let l3key = loop {
            let (a, b) = next_pair::<C, SWAP>(cipher, &mut counter);
            if a < P64 && b < P64 {
                break [a, b];
            }
        };

        Self {
            nhkey,
            polykey,
            l3key,
        }
    }
}

#[cfg(feature = "zeroize")]
impl Drop for KeyContext {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.nhkey.zeroize();
        self.polykey.zeroize();
        self.l3key.zeroize();
    }
}

fn counter_block(domain: u8) -> [u8; 16] {
    let mut block = [0u8; 16];
    block[0] = domain;
    block
}

/// Encrypt the counter block, advance the counter and split the
/// ciphertext into two key words.
fn next_pair<C, const SWAP: bool>(cipher: &C, counter: &mut [u8; 16]) -> (u64, u64)
where
    C: BlockEncrypt + BlockSizeUser<BlockSize = U16>,
{
    let mut block = cipher::Block::<C>::from(*counter);
    cipher.encrypt_block(&mut block);
    counter[15] = counter[15].wrapping_add(1);
    (split_word::<SWAP>(&block[..8]), split_word::<SWAP>(&block[8..]))
}

/// Split one cipher-output word: big-endian natively, mirrored when `SWAP`.
#[inline]
fn split_word<const SWAP: bool>(bytes: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(bytes);
    if SWAP {
        u64::from_le_bytes(word)
    } else {
        u64::from_be_bytes(word)
    }
}
