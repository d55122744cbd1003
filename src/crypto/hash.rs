//! BLAKE2b-256, the digest behind Sui addresses and transaction signing.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

pub type Blake2b256 = Blake2b<U32>;

pub const DIGEST_LENGTH: usize = 32;

pub fn blake2b256(data: &[u8]) -> [u8; DIGEST_LENGTH] {
    Blake2b256::digest(data).into()
}

/// Hash several slices as if they were concatenated.
pub fn blake2b256_concat(parts: &[&[u8]]) -> [u8; DIGEST_LENGTH] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}
