//! # Adapters Module
//!
//! In-memory implementations of the outbound ports.
//!
//! - `memory_store`: ordered in-memory key-value store
//! - `state_executor`: balance/nonce executor with receipt consumption

pub mod memory_store;
pub mod state_executor;

pub use memory_store::InMemoryKVStore;
pub use state_executor::{InMemoryStateExecutor, ShardState};
