//! # Shard Transactions
//!
//! Two kinds of transaction travel in a collation body:
//!
//! - `Signed`: an ordinary value transfer authorized by a secp256k1 signature
//! - `ReceiptConsuming`: delivers a cross-shard receipt; it carries no
//!   signature, the receipt id is its authorization
//!
//! ## Wire Format
//!
//! ```text
//! Signed:           [0, nonce, gasprice, startgas, to, value, data, signature]
//! ReceiptConsuming: [1, shard_id, receipt_id]
//! ```

use super::codec::{decode_fixed, decode_shard_id, decode_wei, encode_wei};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};
use shared_crypto::{keccak256, recover_address, CryptoError, Secp256k1KeyPair};
use shared_types::{Address, Hash, ReceiptId, ShardId, Wei};

const TAG_SIGNED: u64 = 0;
const TAG_RECEIPT_CONSUMING: u64 = 1;

/// A transaction inside a collation body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transaction {
    /// Signed value transfer.
    Signed {
        /// Sender nonce.
        nonce: u64,
        /// Price per unit of gas.
        gasprice: u64,
        /// Gas limit of the transaction.
        startgas: u64,
        /// Recipient.
        to: Address,
        /// Transferred value.
        value: Wei,
        /// Call data.
        data: Vec<u8>,
        /// 65-byte recoverable signature over the unsigned fields.
        signature: Vec<u8>,
    },
    /// Consumes a receipt created on the sending chain.
    ReceiptConsuming {
        /// Shard the receipt is delivered to.
        shard_id: ShardId,
        /// Receipt being consumed.
        receipt_id: ReceiptId,
    },
}

/// Fields of a signed transaction before signing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsignedTransaction {
    /// Sender nonce.
    pub nonce: u64,
    /// Price per unit of gas.
    pub gasprice: u64,
    /// Gas limit of the transaction.
    pub startgas: u64,
    /// Recipient.
    pub to: Address,
    /// Transferred value.
    pub value: Wei,
    /// Call data.
    pub data: Vec<u8>,
}

impl UnsignedTransaction {
    /// Hash the sender signs.
    pub fn signing_hash(&self) -> Hash {
        let mut s = RlpStream::new_list(6);
        s.append(&self.nonce);
        s.append(&self.gasprice);
        s.append(&self.startgas);
        s.append(&self.to.to_vec());
        s.append(&encode_wei(self.value));
        s.append(&self.data);
        keccak256(&s.out())
    }

    /// Sign with `key`.
    pub fn sign(self, key: &Secp256k1KeyPair) -> Result<Transaction, CryptoError> {
        let signature = key.sign_hash(&self.signing_hash())?.to_vec();
        Ok(Transaction::Signed {
            nonce: self.nonce,
            gasprice: self.gasprice,
            startgas: self.startgas,
            to: self.to,
            value: self.value,
            data: self.data,
            signature,
        })
    }
}

impl Transaction {
    /// Content hash of the wire encoding.
    pub fn hash(&self) -> Hash {
        keccak256(&rlp::encode(self))
    }

    /// Recover the sender of a signed transaction.
    ///
    /// `None` for receipt-consuming transactions.
    pub fn sender(&self) -> Option<Result<Address, CryptoError>> {
        match self {
            Transaction::Signed {
                nonce,
                gasprice,
                startgas,
                to,
                value,
                data,
                signature,
            } => {
                let unsigned = UnsignedTransaction {
                    nonce: *nonce,
                    gasprice: *gasprice,
                    startgas: *startgas,
                    to: *to,
                    value: *value,
                    data: data.clone(),
                };
                Some(recover_address(&unsigned.signing_hash(), signature))
            }
            Transaction::ReceiptConsuming { .. } => None,
        }
    }
}

impl Encodable for Transaction {
    fn rlp_append(&self, s: &mut RlpStream) {
        match self {
            Transaction::Signed {
                nonce,
                gasprice,
                startgas,
                to,
                value,
                data,
                signature,
            } => {
                s.begin_list(8);
                s.append(&TAG_SIGNED);
                s.append(nonce);
                s.append(gasprice);
                s.append(startgas);
                s.append(&to.to_vec());
                s.append(&encode_wei(*value));
                s.append(data);
                s.append(signature);
            }
            Transaction::ReceiptConsuming {
                shard_id,
                receipt_id,
            } => {
                s.begin_list(3);
                s.append(&TAG_RECEIPT_CONSUMING);
                s.append(&u64::from(*shard_id));
                s.append(receipt_id);
            }
        }
    }
}

impl Decodable for Transaction {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if !rlp.is_list() {
            return Err(DecoderError::RlpExpectedToBeList);
        }
        let tag: u64 = rlp.val_at(0)?;
        match (tag, rlp.item_count()?) {
            (TAG_SIGNED, 8) => Ok(Transaction::Signed {
                nonce: rlp.val_at(1)?,
                gasprice: rlp.val_at(2)?,
                startgas: rlp.val_at(3)?,
                to: decode_fixed::<20>(rlp, 4)?,
                value: decode_wei(rlp, 5)?,
                data: rlp.val_at(6)?,
                signature: rlp.val_at(7)?,
            }),
            (TAG_RECEIPT_CONSUMING, 3) => Ok(Transaction::ReceiptConsuming {
                shard_id: decode_shard_id(rlp, 1)?,
                receipt_id: rlp.val_at(2)?,
            }),
            (TAG_SIGNED, _) | (TAG_RECEIPT_CONSUMING, _) => Err(DecoderError::RlpIncorrectListLen),
            _ => Err(DecoderError::Custom("unknown transaction kind")),
        }
    }
}
