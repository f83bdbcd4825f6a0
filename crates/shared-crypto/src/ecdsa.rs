//! # ECDSA Signatures (secp256k1)
//!
//! Recoverable secp256k1 signatures over 32-byte prehashes.
//!
//! ## Wire Format
//!
//! 65 bytes: `r (32) || s (32) || v (1)` with `v` in `{27, 28}`.
//! `v` values `{0, 1}` are accepted on decode.
//!
//! ## Use Cases
//!
//! - Collation header signatures (signing hash = Keccak-256 of the unsigned header)
//! - Validator withdrawals (message = `keccak256("withdraw")`)
//! - Signed shard transactions

use crate::hashing::keccak256;
use crate::CryptoError;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use shared_types::{Address, Hash};
use zeroize::Zeroize;

/// Length of a recoverable signature in bytes.
pub const SIGNATURE_LENGTH: usize = 65;

/// Recoverable ECDSA signature (`r || s || v`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoverableSignature([u8; SIGNATURE_LENGTH]);

impl RecoverableSignature {
    /// Parse from a byte slice, checking length and recovery id.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(CryptoError::InvalidSignatureLength {
                expected: SIGNATURE_LENGTH,
                actual: bytes.len(),
            });
        }
        parse_recovery_id(bytes[64])?;
        let mut out = [0u8; SIGNATURE_LENGTH];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// Copy into an owned vector (header and transaction fields).
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

/// secp256k1 ECDSA keypair.
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
}

impl Secp256k1KeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes((&bytes).into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Ethereum-style address of this key.
    pub fn address(&self) -> Address {
        address_of(self.signing_key.verifying_key())
    }

    /// Sign a 32-byte prehash (deterministic RFC 6979).
    pub fn sign_hash(&self, hash: &Hash) -> Result<RecoverableSignature, CryptoError> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(hash)
            .map_err(|_| CryptoError::SigningFailed)?;

        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = recovery_id.to_byte() + 27;
        Ok(RecoverableSignature(out))
    }
}

impl Drop for Secp256k1KeyPair {
    fn drop(&mut self) {
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        bytes.zeroize();
    }
}

/// Recover the signer's address from a 65-byte signature over `hash`.
pub fn recover_address(hash: &Hash, signature: &[u8]) -> Result<Address, CryptoError> {
    let signature = RecoverableSignature::from_slice(signature)?;
    let bytes = signature.as_bytes();
    let recovery_id = parse_recovery_id(bytes[64])?;

    let sig = Signature::from_slice(&bytes[..64]).map_err(|_| CryptoError::InvalidSignatureFormat)?;

    let recovered = VerifyingKey::recover_from_prehash(hash, &sig, recovery_id)
        .map_err(|_| CryptoError::RecoveryFailed)?;

    Ok(address_of(&recovered))
}

fn parse_recovery_id(v: u8) -> Result<RecoveryId, CryptoError> {
    let normalized = match v {
        0 | 1 => v,
        27 | 28 => v - 27,
        other => return Err(CryptoError::InvalidRecoveryId(other)),
    };
    RecoveryId::from_byte(normalized).ok_or(CryptoError::InvalidRecoveryId(v))
}

fn address_of(key: &VerifyingKey) -> Address {
    let encoded = key.to_encoded_point(false);
    // Skip the 0x04 uncompressed-point prefix
    let hash = keccak256(&encoded.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}
