//! # SC-03 Shard Chain
//!
//! Collation store and fork choice, one instance per shard.
//!
//! **Subsystem ID:** 03
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Hold the DAG of collations of a shard, keyed by header hash with
//!   explicit parent links
//! - Judge each collation `Accepted`, `Invalid` or `Orphaned`, delegating
//!   body execution to a [`StateExecutor`]
//! - Score collations by chain length with a lazily filled cache
//! - Track the head per main-chain vantage block
//! - Queue orphans and re-validate them when the parent arrives
//!
//! ## Wire Formats
//!
//! Headers and transactions are RLP lists (see [`domain::collation`] and
//! [`domain::transaction`]); persisted metadata is bincode.
//!
//! ## Module Structure
//!
//! ```text
//! sc-03-shard-chain/
//! ├── domain/          # Collation, CollationHeader, Transaction, status, errors
//! ├── algorithms/      # Lazy score fill, ParentQueue
//! ├── ports/           # KeyValueStore, StateExecutor (outbound)
//! ├── adapters/        # InMemoryKVStore, InMemoryStateExecutor
//! └── service.rs       # ShardChain
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{InMemoryKVStore, InMemoryStateExecutor, ShardState};
pub use algorithms::{score_child, score_of, ParentQueue, QueuedCollation, ScoreFill, ScoreLookup};
pub use domain::{
    tx_list_root, AddCollationOutcome, CodecError, Collation, CollationHeader, CollationReport,
    CollationStatus, ExecutionError, HeadChange, KVStoreError, ShardChainError, ShardChainResult,
    Transaction, UnsignedTransaction,
};
pub use ports::{BatchOperation, ExecutionOutcome, KeyValueStore, StateExecutor};
pub use service::{InvalidListener, NewHeadCallback, ShardChain};

/// In-memory shard chain used by simulations and tests.
pub type InMemoryShardChain = ShardChain<InMemoryKVStore, InMemoryStateExecutor>;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
