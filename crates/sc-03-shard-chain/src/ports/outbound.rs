//! # Outbound Ports (Driven Ports)
//!
//! Dependencies the shard chain requires from its host.

use crate::domain::{Collation, ExecutionError, KVStoreError, Transaction};
use serde::{Deserialize, Serialize};
use shared_types::{Address, Hash, ReceiptId};

/// Abstract interface for key-value database operations.
///
/// Testing and simulation: `InMemoryKVStore`.
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Execute an atomic batch write.
    ///
    /// Either every operation in the batch is applied or none is.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError>;
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put {
        /// Key
        key: Vec<u8>,
        /// Value
        value: Vec<u8>,
    },
    /// Delete a key.
    Delete {
        /// Key
        key: Vec<u8>,
    },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// Result of applying a collation body to its parent state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// State root after the body.
    pub post_state_root: Hash,
    /// Storage keys written.
    pub changed_keys: Vec<Vec<u8>>,
    /// Storage keys removed.
    pub deleted_keys: Vec<Vec<u8>>,
    /// Receipts consumed by the body, in body order.
    pub consumed_receipts: Vec<ReceiptId>,
    /// Gas charged for the body.
    pub gas_used: u64,
}

/// External state execution engine for one shard.
///
/// The shard chain treats it as opaque: it only looks at pass/fail, the
/// post-state root and the key summaries.
pub trait StateExecutor: Send + Sync {
    /// Root of the shard's genesis state.
    fn genesis_root(&self) -> Hash;

    /// Apply `collation` on top of `parent_state`.
    ///
    /// On success the resulting state is retained under its root so that
    /// children can build on it.
    fn apply(
        &mut self,
        parent_state: &Hash,
        collation: &Collation,
    ) -> Result<ExecutionOutcome, ExecutionError>;

    /// Root a body would produce, without retaining anything.
    ///
    /// Used by proposers to fill in `post_state_root` before signing.
    fn post_state_root(
        &self,
        parent_state: &Hash,
        transactions: &[Transaction],
        coinbase: Address,
    ) -> Result<Hash, ExecutionError>;
}
