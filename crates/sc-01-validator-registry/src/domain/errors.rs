//! # Domain Errors
//!
//! Every variant describes a reverted call: registry state is unchanged
//! whenever one of these is returned.

use shared_types::{Address, SlotIndex, Wei};
use thiserror::Error;

/// Registry error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The validation code already backs a deposited validator.
    #[error("Validation code {0:02x?} is already deposited")]
    DuplicateValidationCode(Address),

    /// Deposit value differs from the protocol stake.
    #[error("Wrong deposit value: expected {expected}, got {got}")]
    WrongDepositValue {
        /// Required stake
        expected: Wei,
        /// Value sent
        got: Wei,
    },

    /// Slot index is out of range or free.
    #[error("Unknown validator slot: {0}")]
    UnknownSlot(SlotIndex),

    /// No validation code is deployed at the address.
    #[error("No validation code at {0:02x?}")]
    UnknownValidationCode(Address),

    /// The validation code ran out of gas.
    #[error("Validation code out of gas: needs {required}, limit {limit}")]
    OutOfGas {
        /// Gas the check needs
        required: u64,
        /// Gas available
        limit: u64,
    },

    /// The validation code did not accept the signature.
    #[error("Signature rejected by validation code")]
    SignatureMismatch,
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
