//! # Domain Module
//!
//! Receipts and the two stores that bracket their lifetime.

pub mod entities;
pub mod errors;
pub mod ledger;
pub mod used_receipts;

pub use entities::*;
pub use errors::*;
pub use ledger::ReceiptLedger;
pub use used_receipts::UsedReceiptStore;
