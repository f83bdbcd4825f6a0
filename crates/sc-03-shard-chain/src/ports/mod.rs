//! # Ports Layer
//!
//! Outbound ports the shard chain drives: persistence and state execution.

pub mod outbound;

pub use outbound::{BatchOperation, ExecutionOutcome, KeyValueStore, StateExecutor};
