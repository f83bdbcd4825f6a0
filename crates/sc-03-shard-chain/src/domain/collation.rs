//! # Collations
//!
//! A collation is the shard-chain analog of a block: a signed header plus an
//! ordered transaction list.
//!
//! ## Header Wire Format
//!
//! ```text
//! [shard_id, expected_period_number, period_start_prevhash, parent_collation_hash,
//!  tx_list_root, coinbase, post_state_root, receipt_root, number, signature]
//! ```
//!
//! The signing hash is Keccak-256 over the same list without `signature`.
//! The header hash (collation identity) is Keccak-256 over the full list.

use super::codec::{decode_fixed, decode_shard_id};
use super::errors::CodecError;
use super::transaction::Transaction;
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};
use shared_crypto::{keccak256, CryptoError, Secp256k1KeyPair};
use shared_types::{Address, Hash, PeriodNumber, ShardId, GENESIS_HASH};

const HEADER_FIELDS: usize = 10;

/// Collation header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollationHeader {
    /// Shard this collation extends.
    pub shard_id: ShardId,
    /// Period the collation was built for.
    pub expected_period_number: PeriodNumber,
    /// Hash of the main-chain block preceding the period.
    pub period_start_prevhash: Hash,
    /// Parent collation (`GENESIS_HASH` for the first collation).
    pub parent_collation_hash: Hash,
    /// Root of the transaction list.
    pub tx_list_root: Hash,
    /// Fee recipient.
    pub coinbase: Address,
    /// State root after applying the body.
    pub post_state_root: Hash,
    /// Root of the transaction receipts.
    pub receipt_root: Hash,
    /// Height in the shard chain (first collation is 1).
    pub number: u64,
    /// Collator signature over [`CollationHeader::signing_hash`].
    pub signature: Vec<u8>,
}

impl CollationHeader {
    fn append_unsigned(&self, s: &mut RlpStream) {
        s.append(&u64::from(self.shard_id));
        s.append(&self.expected_period_number);
        s.append(&self.period_start_prevhash.to_vec());
        s.append(&self.parent_collation_hash.to_vec());
        s.append(&self.tx_list_root.to_vec());
        s.append(&self.coinbase.to_vec());
        s.append(&self.post_state_root.to_vec());
        s.append(&self.receipt_root.to_vec());
        s.append(&self.number);
    }

    /// Hash the collator signs.
    pub fn signing_hash(&self) -> Hash {
        let mut s = RlpStream::new_list(HEADER_FIELDS - 1);
        self.append_unsigned(&mut s);
        keccak256(&s.out())
    }

    /// Collation identity.
    pub fn hash(&self) -> Hash {
        keccak256(&self.encode())
    }

    /// Sign in place with `key`.
    pub fn sign(&mut self, key: &Secp256k1KeyPair) -> Result<(), CryptoError> {
        self.signature = key.sign_hash(&self.signing_hash())?.to_vec();
        Ok(())
    }

    /// Whether this collation builds directly on genesis.
    pub fn is_first(&self) -> bool {
        self.parent_collation_hash == GENESIS_HASH
    }

    /// Wire encoding.
    pub fn encode(&self) -> Vec<u8> {
        rlp::encode(self).to_vec()
    }

    /// Decode the wire encoding.
    ///
    /// Only the byte-exact encoding is accepted: trailing bytes or any other
    /// form that does not re-encode to `bytes` is refused.
    pub fn decode_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let header: Self = rlp::decode(bytes)?;
        let canonical = header.encode();
        if canonical != bytes {
            return Err(CodecError::NonCanonical {
                got: bytes.len(),
                canonical: canonical.len(),
            });
        }
        Ok(header)
    }
}

impl Encodable for CollationHeader {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(HEADER_FIELDS);
        self.append_unsigned(s);
        s.append(&self.signature);
    }
}

impl Decodable for CollationHeader {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if !rlp.is_list() {
            return Err(DecoderError::RlpExpectedToBeList);
        }
        if rlp.item_count()? != HEADER_FIELDS {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Self {
            shard_id: decode_shard_id(rlp, 0)?,
            expected_period_number: rlp.val_at(1)?,
            period_start_prevhash: decode_fixed::<32>(rlp, 2)?,
            parent_collation_hash: decode_fixed::<32>(rlp, 3)?,
            tx_list_root: decode_fixed::<32>(rlp, 4)?,
            coinbase: decode_fixed::<20>(rlp, 5)?,
            post_state_root: decode_fixed::<32>(rlp, 6)?,
            receipt_root: decode_fixed::<32>(rlp, 7)?,
            number: rlp.val_at(8)?,
            signature: rlp.val_at(9)?,
        })
    }
}

/// Root of an ordered transaction list.
pub fn tx_list_root(transactions: &[Transaction]) -> Hash {
    let mut s = RlpStream::new_list(transactions.len());
    for tx in transactions {
        s.append(tx);
    }
    keccak256(&s.out())
}

/// Header plus body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collation {
    /// Signed header.
    pub header: CollationHeader,
    /// Ordered body.
    pub transactions: Vec<Transaction>,
}

impl Collation {
    /// Create a collation.
    pub fn new(header: CollationHeader, transactions: Vec<Transaction>) -> Self {
        Self {
            header,
            transactions,
        }
    }

    /// Collation identity (the header hash).
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    /// Whether the header commits to this body.
    pub fn body_matches_header(&self) -> bool {
        tx_list_root(&self.transactions) == self.header.tx_list_root
    }
}
