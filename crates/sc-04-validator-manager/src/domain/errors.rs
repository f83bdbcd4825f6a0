//! # Domain Errors
//!
//! Every manager call either succeeds or reverts with one of these; nothing
//! is mutated on the error path.

use sc_01_validator_registry::RegistryError;
use sc_02_cross_shard_receipts::ReceiptError;
use sc_03_shard_chain::{CodecError, ExecutionError, ShardChainError};
use shared_crypto::CryptoError;
use shared_types::{BlockNumber, Hash, PeriodNumber, ShardId};
use thiserror::Error;

/// Validator manager errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManagerError {
    /// Registry call reverted.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Receipt call reverted.
    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    /// Shard chain failure.
    #[error(transparent)]
    ShardChain(#[from] ShardChainError),

    /// Header bytes did not decode.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Signing failure while building a collation.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Body cannot be executed on the requested parent.
    #[error("Cannot build collation: {0}")]
    Execution(ExecutionError),

    /// Shard id out of range.
    #[error("Invalid shard {0}")]
    InvalidShard(ShardId),

    /// Header is not for the current period.
    #[error("Header for period {got}, current period is {expected}")]
    WrongPeriod {
        /// Current period
        expected: PeriodNumber,
        /// Period named by the header
        got: PeriodNumber,
    },

    /// `period_start_prevhash` does not match the main chain.
    #[error("Period start prevhash mismatch for period {period}")]
    WrongPeriodStartPrevhash {
        /// Period named by the header
        period: PeriodNumber,
    },

    /// Parent header is neither genesis nor recorded for the shard.
    #[error("Unknown parent header {0:02x?}")]
    UnknownParentHeader(Hash),

    /// Header is not recorded for the shard.
    #[error("Unknown header {0:02x?}")]
    UnknownHeader(Hash),

    /// Header number is not parent number + 1.
    #[error("Header number {got}, expected {expected}")]
    WrongNumber {
        /// Parent number + 1
        expected: u64,
        /// Number in the header
        got: u64,
    },

    /// The shard already has a header this period.
    #[error("Shard {shard_id} already has a header in period {period}")]
    PeriodAlreadyFilled {
        /// Shard
        shard_id: ShardId,
        /// Current period
        period: PeriodNumber,
    },

    /// No validator could be sampled for the shard.
    #[error("No collator available for shard {0}")]
    NoCollator(ShardId),

    /// Main-chain block not available.
    #[error("Unknown main-chain block {0}")]
    UnknownBlock(BlockNumber),
}

/// Result type for validator manager operations.
pub type ManagerResult<T> = Result<T, ManagerError>;
