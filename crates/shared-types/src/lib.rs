//! # Shared Types Crate
//!
//! Primitive identifiers and protocol configuration used across all
//! Shard-Chain subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: identifiers (`Hash`, `Address`, `ShardId`,
//!   `ReceiptId`, `SlotIndex`) are defined once here.
//! - **Explicit Sentinels**: the zero address and the genesis collation hash
//!   are named constants, never magic literals at call sites.

pub mod config;
pub mod entities;
pub mod errors;

pub use config::ProtocolConfig;
pub use entities::*;
pub use errors::*;
