//! # Domain Entities
//!
//! Validator records and the values a successful withdrawal releases.

use serde::{Deserialize, Serialize};
use shared_crypto::keccak256;
use shared_types::{Address, Hash, SlotIndex, Wei};

/// One occupied slot of the validator table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorRecord {
    /// Stake held for this validator.
    pub deposit: Wei,
    /// Validation code that must authorize this validator's signatures.
    pub validation_code_addr: Address,
    /// Refund destination on withdrawal.
    pub return_addr: Address,
}

/// Funds released by a successful withdrawal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    /// Slot that was freed.
    pub slot: SlotIndex,
    /// Validation code that is no longer deposited.
    pub validation_code_addr: Address,
    /// Refund destination.
    pub return_addr: Address,
    /// Refunded stake.
    pub amount: Wei,
}

/// Message every withdrawal signature must sign: `keccak256("withdraw")`.
pub fn withdraw_message() -> Hash {
    keccak256(b"withdraw")
}
