//! # Inbound Ports
//!
//! API trait defining what a sharding node can do for async callers.

use crate::domain::{ManagerResult, Submission};
use async_trait::async_trait;
use sc_01_validator_registry::Withdrawal;
use sc_02_cross_shard_receipts::ReceiptRequest;
use sc_03_shard_chain::{Collation, CollationReport};
use shared_types::{Address, Hash, PeriodNumber, ReceiptId, ShardId, SlotIndex, Wei};

/// Sharding API - inbound port.
#[async_trait]
pub trait ShardingApi: Send + Sync {
    /// Record a collation header and judge its body.
    async fn submit_collation(&self, collation: Collation) -> ManagerResult<Submission>;

    /// Deliver bodies whose headers are already recorded.
    async fn import_collations(
        &self,
        batch: Vec<Collation>,
    ) -> Vec<(Hash, ManagerResult<CollationReport>)>;

    /// Stake for a validation code.
    async fn deposit(
        &self,
        validation_code_addr: Address,
        return_addr: Address,
        value: Wei,
    ) -> ManagerResult<SlotIndex>;

    /// Withdraw a validator.
    async fn withdraw(&self, slot: SlotIndex, signature: Vec<u8>) -> ManagerResult<Withdrawal>;

    /// Escrow a cross-shard call.
    async fn tx_to_shard(&self, request: ReceiptRequest) -> ManagerResult<ReceiptId>;

    /// Collator of a shard for the current period.
    fn sample(&self, shard_id: ShardId) -> ManagerResult<Address>;

    /// Main chain's head for a shard.
    fn get_head(&self, shard_id: ShardId) -> Hash;

    /// Shard chain's own head and its score.
    fn shard_head(&self, shard_id: ShardId) -> ManagerResult<(Hash, u64)>;

    /// Current period.
    fn current_period(&self) -> PeriodNumber;

    /// Get total shard count.
    fn shard_count(&self) -> ShardId;
}
