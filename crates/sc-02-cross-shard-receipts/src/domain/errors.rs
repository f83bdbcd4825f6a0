//! # Domain Errors
//!
//! A receipt error reverts the call: the `consumed` flag and every used set
//! stay as they were.

use super::entities::CallOrigin;
use shared_types::{ReceiptId, ShardId};
use thiserror::Error;

/// Receipt protocol errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReceiptError {
    /// No receipt with this id was created.
    #[error("Unknown receipt: {0}")]
    UnknownReceipt(ReceiptId),

    /// The receipt was consumed before.
    #[error("Receipt {0} already consumed")]
    AlreadyConsumed(ReceiptId),

    /// The receipt targets another shard.
    #[error("Receipt {receipt_id} targets shard {expected}, consumed on shard {got}")]
    WrongShard {
        /// Receipt being consumed
        receipt_id: ReceiptId,
        /// Shard named by the receipt
        expected: ShardId,
        /// Shard attempting consumption
        got: ShardId,
    },

    /// The used-receipt store was called from outside its shard.
    #[error("Shard {shard_id} used-receipt store called by {origin:?}")]
    ForeignCaller {
        /// Shard owning the store
        shard_id: ShardId,
        /// Rejected caller
        origin: CallOrigin,
    },

    /// The destination shard does not exist.
    #[error("Invalid destination shard: {0}")]
    InvalidShard(ShardId),
}

/// Result type for receipt operations.
pub type ReceiptResult<T> = Result<T, ReceiptError>;
