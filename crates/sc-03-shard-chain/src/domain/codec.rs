//! RLP field helpers shared by headers and transactions.

use rlp::{DecoderError, Rlp};
use shared_types::Wei;

/// Minimal big-endian bytes of a wei amount (empty for zero).
pub fn encode_wei(value: Wei) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    bytes[first..].to_vec()
}

/// Decode a wei amount written by [`encode_wei`].
pub fn decode_wei(rlp: &Rlp, index: usize) -> Result<Wei, DecoderError> {
    let bytes: Vec<u8> = rlp.val_at(index)?;
    if bytes.len() > 16 {
        return Err(DecoderError::RlpIsTooBig);
    }
    if bytes.first() == Some(&0) {
        return Err(DecoderError::RlpDataLenWithZeroPrefix);
    }
    let mut word = [0u8; 16];
    word[16 - bytes.len()..].copy_from_slice(&bytes);
    Ok(Wei::from_be_bytes(word))
}

/// Decode a fixed-width byte string (hashes, addresses).
pub fn decode_fixed<const N: usize>(rlp: &Rlp, index: usize) -> Result<[u8; N], DecoderError> {
    let bytes: Vec<u8> = rlp.val_at(index)?;
    if bytes.len() != N {
        return Err(DecoderError::Custom("fixed-width field has wrong length"));
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Decode a shard id carried as an RLP integer.
pub fn decode_shard_id(rlp: &Rlp, index: usize) -> Result<u32, DecoderError> {
    let value: u64 = rlp.val_at(index)?;
    u32::try_from(value).map_err(|_| DecoderError::Custom("shard id out of range"))
}
