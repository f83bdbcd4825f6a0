//! # SC-04 Validator Manager
//!
//! The main-chain side of the sharding protocol and the node that ties it to
//! the shard chains.
//!
//! **Subsystem ID:** 04
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Stake and unstake validators through the registry
//! - Sample the collator of each shard per period from main-chain seeds
//! - Record collation headers: period, prevhash, linkage, one header per
//!   shard per period, collator signature
//! - Escrow cross-shard calls as receipts and settle them once consumed
//! - Route collation bodies to per-shard [`sc_03_shard_chain::ShardChain`]s
//!
//! ## Events
//!
//! | Event | Emitted by |
//! |-------|------------|
//! | `Deposit` | `deposit` |
//! | `Withdraw` | `withdraw` |
//! | `AddHeader` / `ChangeHead` | `add_header` |
//! | `TxToShard` | `tx_to_shard` |
//! | `AddUsedReceipt` | receipt settlement |
//! | `CollationRejected` | shard chain invalid listeners |
//!
//! ## Module Structure
//!
//! ```text
//! sc-04-validator-manager/
//! ├── domain/          # HeaderRecord, HeaderTable, ManagerEvent, ManagerError
//! ├── ports/           # ShardingApi (inbound), MainChainView, EventBus (outbound)
//! ├── adapters/        # InMemoryMainChain, InMemoryEventBus
//! ├── manager.rs       # ValidatorManager
//! ├── node.rs          # ShardingNode
//! └── service.rs       # ShardingService
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod manager;
pub mod node;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{InMemoryEventBus, InMemoryMainChain};
pub use domain::{
    AddedHeader, HeaderRecord, HeaderTable, ManagerError, ManagerEvent, ManagerResult, Submission,
};
pub use manager::ValidatorManager;
pub use node::ShardingNode;
pub use ports::{EventBus, MainChainView, ShardingApi};
pub use service::ShardingService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
