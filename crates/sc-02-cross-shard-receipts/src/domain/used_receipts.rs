//! # Used-Receipt Store
//!
//! Per-shard set of consumed receipt ids. Each shard owns its store, so
//! shards never contend on it. Writes are accepted only from the shard's own
//! execution context.

use super::entities::{CallOrigin, Receipt};
use super::errors::{ReceiptError, ReceiptResult};
use serde::{Deserialize, Serialize};
use shared_types::{ReceiptId, ShardId};
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Consumed receipt ids of one shard.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsedReceiptStore {
    shard_id: ShardId,
    used: BTreeSet<ReceiptId>,
}

impl UsedReceiptStore {
    /// Empty store for `shard_id`.
    pub fn new(shard_id: ShardId) -> Self {
        Self {
            shard_id,
            used: BTreeSet::new(),
        }
    }

    /// Shard owning this store.
    pub fn shard_id(&self) -> ShardId {
        self.shard_id
    }

    /// Record `receipt_id` as used.
    ///
    /// Fails with `ForeignCaller` unless `origin` is this shard's own
    /// execution, and with `AlreadyConsumed` if the id is already recorded.
    pub fn add_used_receipt(
        &mut self,
        origin: CallOrigin,
        receipt_id: ReceiptId,
    ) -> ReceiptResult<()> {
        if origin != CallOrigin::ShardExecution(self.shard_id) {
            warn!(
                "[sc-02] Rejected add_used_receipt({}) on shard {} from {:?}",
                receipt_id, self.shard_id, origin
            );
            return Err(ReceiptError::ForeignCaller {
                shard_id: self.shard_id,
                origin,
            });
        }
        if !self.used.insert(receipt_id) {
            return Err(ReceiptError::AlreadyConsumed(receipt_id));
        }

        info!(
            "[sc-02] add_used_receipt: receipt {} used on shard {}",
            receipt_id, self.shard_id
        );
        Ok(())
    }

    /// Whether `receipt_id` has been consumed on this shard.
    pub fn get_used_receipts(&self, receipt_id: ReceiptId) -> bool {
        self.used.contains(&receipt_id)
    }

    /// Consume `receipt` from inside this shard.
    ///
    /// Checks the destination before touching the set.
    pub fn consume(&mut self, receipt_id: ReceiptId, receipt: &Receipt) -> ReceiptResult<()> {
        if receipt.shard_id != self.shard_id {
            return Err(ReceiptError::WrongShard {
                receipt_id,
                expected: receipt.shard_id,
                got: self.shard_id,
            });
        }
        self.add_used_receipt(CallOrigin::ShardExecution(self.shard_id), receipt_id)
    }

    /// Number of consumed receipts.
    pub fn len(&self) -> usize {
        self.used.len()
    }

    /// Whether no receipt was consumed yet.
    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    /// Consumed ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &ReceiptId> {
        self.used.iter()
    }
}
