//! # Adapters Layer (Hexagonal Architecture)

mod shared_ledger;

pub use shared_ledger::SharedReceiptLedger;
