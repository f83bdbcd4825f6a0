//! # Outbound Ports
//!
//! The main chain the manager reads seeds and period hashes from, and the
//! sink its events go to.

use crate::domain::ManagerEvent;
use shared_types::{BlockNumber, Hash};

/// Read-only view of the main chain - outbound port.
pub trait MainChainView: Send + Sync {
    /// Number of the latest block.
    fn block_number(&self) -> BlockNumber;

    /// Hash of block `number`, if it exists.
    fn block_hash(&self, number: BlockNumber) -> Option<Hash>;
}

/// Event sink - outbound port.
pub trait EventBus: Send + Sync {
    /// Publish one event.
    fn publish(&self, event: ManagerEvent);
}
