//! Sharding Service
//!
//! Implements the `ShardingApi` port over a [`ShardingNode`] shared behind a
//! read-write lock. Queries take the read side; anything that mutates the
//! main chain or a shard chain takes the write side for the whole call.

use crate::domain::{ManagerResult, Submission};
use crate::node::ShardingNode;
use crate::ports::{MainChainView, ShardingApi};
use async_trait::async_trait;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use sc_01_validator_registry::Withdrawal;
use sc_02_cross_shard_receipts::ReceiptRequest;
use sc_03_shard_chain::{Collation, CollationReport};
use shared_types::{Address, Hash, PeriodNumber, ReceiptId, ShardId, SlotIndex, Wei};

/// Sharding service.
pub struct ShardingService<M: MainChainView> {
    node: RwLock<ShardingNode<M>>,
}

impl<M: MainChainView> ShardingService<M> {
    /// Wrap a node.
    pub fn new(node: ShardingNode<M>) -> Self {
        Self {
            node: RwLock::new(node),
        }
    }

    /// Read access to the node.
    pub fn read(&self) -> RwLockReadGuard<'_, ShardingNode<M>> {
        self.node.read()
    }

    /// Write access to the node (mining, header-only submissions).
    pub fn write(&self) -> RwLockWriteGuard<'_, ShardingNode<M>> {
        self.node.write()
    }

    /// Unwrap the node.
    pub fn into_inner(self) -> ShardingNode<M> {
        self.node.into_inner()
    }
}

#[async_trait]
impl<M: MainChainView> ShardingApi for ShardingService<M> {
    async fn submit_collation(&self, collation: Collation) -> ManagerResult<Submission> {
        self.node.write().submit_collation(collation)
    }

    async fn import_collations(
        &self,
        batch: Vec<Collation>,
    ) -> Vec<(Hash, ManagerResult<CollationReport>)> {
        self.node.write().import_collations(batch)
    }

    async fn deposit(
        &self,
        validation_code_addr: Address,
        return_addr: Address,
        value: Wei,
    ) -> ManagerResult<SlotIndex> {
        self.node
            .write()
            .manager_mut()
            .deposit(validation_code_addr, return_addr, value)
    }

    async fn withdraw(&self, slot: SlotIndex, signature: Vec<u8>) -> ManagerResult<Withdrawal> {
        self.node
            .write()
            .manager_mut()
            .try_withdraw(slot, &signature)
    }

    async fn tx_to_shard(&self, request: ReceiptRequest) -> ManagerResult<ReceiptId> {
        self.node.write().manager_mut().tx_to_shard(request)
    }

    fn sample(&self, shard_id: ShardId) -> ManagerResult<Address> {
        self.node.read().manager().sample(shard_id)
    }

    fn get_head(&self, shard_id: ShardId) -> Hash {
        self.node.read().manager().get_head(shard_id)
    }

    fn shard_head(&self, shard_id: ShardId) -> ManagerResult<(Hash, u64)> {
        let node = self.node.read();
        let chain = node.shard(shard_id)?;
        Ok((chain.head(), chain.head_score()))
    }

    fn current_period(&self) -> PeriodNumber {
        self.node.read().manager().current_period()
    }

    fn shard_count(&self) -> ShardId {
        self.node.read().manager().config().shard_count
    }
}
