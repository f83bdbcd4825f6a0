//! # Domain Errors
//!
//! `ExecutionError` is a verdict on one collation: it marks the collation
//! `Invalid` and never propagates further. `ShardChainError` is an
//! infrastructure failure of the shard chain itself.

use sc_02_cross_shard_receipts::ReceiptError;
use shared_types::{Hash, ReceiptId, ShardId};
use thiserror::Error;

/// Reasons a collation fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// Body does not match `tx_list_root`.
    #[error("Transaction list root mismatch")]
    TxListRootMismatch,

    /// Applying the body produced another state root.
    #[error("Post-state root mismatch: header {expected:02x?}, computed {computed:02x?}")]
    PostStateRootMismatch {
        /// Root claimed by the header
        expected: Hash,
        /// Root computed by execution
        computed: Hash,
    },

    /// Body exceeds the transaction count bound.
    #[error("Too many transactions: {count} > {max}")]
    TooManyTransactions {
        /// Transactions in the body
        count: usize,
        /// Allowed maximum
        max: usize,
    },

    /// Body gas exceeds the collation gas limit.
    #[error("Collation gas {used} exceeds limit {limit}")]
    GasLimitExceeded {
        /// Gas the body requests
        used: u64,
        /// Collation gas limit
        limit: u64,
    },

    /// Signature does not recover a sender.
    #[error("Transaction {index}: bad signature")]
    BadSignature {
        /// Position in the body
        index: usize,
    },

    /// Nonce out of order.
    #[error("Transaction {index}: nonce {got}, expected {expected}")]
    BadNonce {
        /// Position in the body
        index: usize,
        /// Sender's next nonce
        expected: u64,
        /// Nonce in the transaction
        got: u64,
    },

    /// Sender cannot pay value plus fee.
    #[error("Transaction {index}: insufficient balance")]
    InsufficientBalance {
        /// Position in the body
        index: usize,
    },

    /// Receipt-consuming transaction names another shard.
    #[error("Transaction {index}: receipt for shard {got} on shard {expected}")]
    WrongShard {
        /// Position in the body
        index: usize,
        /// Shard executing the body
        expected: ShardId,
        /// Shard named by the transaction
        got: ShardId,
    },

    /// Receipt id was never created.
    #[error("Transaction {index}: unknown receipt {receipt_id}")]
    UnknownReceipt {
        /// Position in the body
        index: usize,
        /// Missing receipt
        receipt_id: ReceiptId,
    },

    /// Receipt protocol refused the consumption.
    #[error("Transaction {index}: {source}")]
    Receipt {
        /// Position in the body
        index: usize,
        /// Underlying receipt error
        source: ReceiptError,
    },

    /// Parent post-state is not available to the executor.
    #[error("Unknown parent state {0:02x?}")]
    UnknownParentState(Hash),

    /// The parent collation is invalid.
    #[error("Parent collation {0:02x?} is invalid")]
    InvalidParent(Hash),

    /// Header failed a structural check.
    #[error("Malformed collation: {0}")]
    Malformed(String),
}

/// Encoding/decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// RLP decoding failed.
    #[error("RLP decode error: {0}")]
    Rlp(String),

    /// Input decodes but is not the canonical encoding of what it decodes to.
    #[error("Non-canonical encoding ({got} bytes, canonical form is {canonical})")]
    NonCanonical {
        /// Input length.
        got: usize,
        /// Length of the canonical re-encoding.
        canonical: usize,
    },

    /// bincode (de)serialization failed.
    #[error("Bincode error: {0}")]
    Bincode(String),
}

impl From<rlp::DecoderError> for CodecError {
    fn from(err: rlp::DecoderError) -> Self {
        CodecError::Rlp(err.to_string())
    }
}

impl From<bincode::Error> for CodecError {
    fn from(err: bincode::Error) -> Self {
        CodecError::Bincode(err.to_string())
    }
}

/// Key-value store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError {
        /// Backend message
        message: String,
    },

    /// Data corruption in the store.
    #[error("KV store corruption: {message}")]
    CorruptionError {
        /// Backend message
        message: String,
    },
}

/// Shard chain infrastructure errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShardChainError {
    /// Collation belongs to another shard.
    #[error("Collation for shard {got} submitted to shard {expected}")]
    WrongShard {
        /// Shard of this chain
        expected: ShardId,
        /// Shard named by the header
        got: ShardId,
    },

    /// Storage failure.
    #[error(transparent)]
    Storage(#[from] KVStoreError),

    /// Encoding failure.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Collation is not known to this chain.
    #[error("Unknown collation {0:02x?}")]
    UnknownCollation(Hash),
}

/// Result type for shard chain operations.
pub type ShardChainResult<T> = Result<T, ShardChainError>;
