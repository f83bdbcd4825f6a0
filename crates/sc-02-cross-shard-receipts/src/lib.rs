//! # SC-02 Cross-Shard Receipts
//!
//! Escrowed cross-shard call intents, consumable at most once.
//!
//! **Subsystem ID:** 02
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Sending side: [`ReceiptLedger`] allocates monotonic receipt ids and
//!   escrows the value of each `tx_to_shard` call
//! - Destination side: one [`UsedReceiptStore`] per shard records consumed
//!   ids; only the shard's own execution context may write to it
//!
//! A receipt can be left unconsumed forever, but never consumed twice.
//!
//! ## Module Structure
//!
//! ```text
//! sc-02-cross-shard-receipts/
//! ├── domain/          # Receipt, ReceiptLedger, UsedReceiptStore, ReceiptError
//! ├── ports/           # ReceiptSource (read access for shard executors)
//! └── adapters/        # SharedReceiptLedger
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::SharedReceiptLedger;
pub use domain::{
    CallOrigin, Receipt, ReceiptError, ReceiptLedger, ReceiptRequest, ReceiptResult,
    UsedReceiptStore,
};
pub use ports::ReceiptSource;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
