//! # Keccak-256 Hashing
//!
//! Content hashing and the 32-byte word encoding used by the sampler.
//!
//! Words are big-endian and left-padded to 32 bytes so that hashes over
//! `(seed, shard_id, index, round)` are byte-identical on every node.

use primitive_types::U256;
use sha3::{Digest, Keccak256};
use shared_types::Hash;

/// Stateful Keccak-256 hasher.
pub struct Keccak256Hasher {
    inner: Keccak256,
}

impl Keccak256Hasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self {
            inner: Keccak256::new(),
        }
    }

    /// Update with data.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Finalize and return hash.
    pub fn finalize(self) -> Hash {
        self.inner.finalize().into()
    }
}

impl Default for Keccak256Hasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash data with Keccak-256 (one-shot).
pub fn keccak256(data: &[u8]) -> Hash {
    Keccak256::digest(data).into()
}

/// Hash the concatenation of multiple inputs.
pub fn keccak256_many(inputs: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256Hasher::new();
    for input in inputs {
        hasher.update(input);
    }
    hasher.finalize()
}

/// Encode an integer as a 32-byte big-endian word.
pub fn word_from_u64(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Interpret `hash` as a 256-bit big-endian integer and reduce it modulo
/// `modulus`. Returns `None` when `modulus` is zero.
pub fn mod_u64(hash: &Hash, modulus: u64) -> Option<u64> {
    if modulus == 0 {
        return None;
    }
    let value = U256::from_big_endian(hash);
    Some((value % U256::from(modulus)).low_u64())
}
