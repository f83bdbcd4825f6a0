//! # Receipt Ledger
//!
//! Sending-side receipt table. Ids are dense and monotonic, starting at 0.

use super::entities::{CallOrigin, Receipt, ReceiptRequest};
use super::errors::{ReceiptError, ReceiptResult};
use super::used_receipts::UsedReceiptStore;
use shared_types::{short_hex, ReceiptId, ShardId, Wei};
use tracing::{info, warn};

/// All receipts created on the sending chain.
#[derive(Clone, Debug)]
pub struct ReceiptLedger {
    shard_count: ShardId,
    receipts: Vec<Receipt>,
    escrowed: Wei,
}

impl ReceiptLedger {
    /// Empty ledger accepting destinations `0..shard_count`.
    pub fn new(shard_count: ShardId) -> Self {
        Self {
            shard_count,
            receipts: Vec::new(),
            escrowed: 0,
        }
    }

    /// Escrow `request.value` and return the new receipt id.
    pub fn create_receipt(&mut self, request: ReceiptRequest) -> ReceiptResult<ReceiptId> {
        if request.shard_id >= self.shard_count {
            return Err(ReceiptError::InvalidShard(request.shard_id));
        }

        let receipt_id = self.receipts.len() as ReceiptId;
        self.escrowed += request.value;

        info!(
            "[sc-02] tx_to_shard: receipt {} from {} to shard {} ({} wei)",
            receipt_id,
            short_hex(&request.sender),
            request.shard_id,
            request.value
        );

        self.receipts.push(Receipt::from(request));
        Ok(receipt_id)
    }

    /// Receipt by id.
    pub fn get(&self, receipt_id: ReceiptId) -> Option<&Receipt> {
        self.receipts.get(receipt_id as usize)
    }

    /// Escrowed value of a receipt.
    pub fn receipt_value(&self, receipt_id: ReceiptId) -> Option<Wei> {
        self.get(receipt_id).map(|r| r.value)
    }

    /// Consume `receipt_id` on `on_shard`, recording it in that shard's store.
    ///
    /// On success the receipt's effects may be applied on the destination
    /// shard; the returned copy carries them.
    pub fn consume_receipt(
        &mut self,
        receipt_id: ReceiptId,
        on_shard: ShardId,
        store: &mut UsedReceiptStore,
    ) -> ReceiptResult<Receipt> {
        let receipt = self
            .get(receipt_id)
            .ok_or(ReceiptError::UnknownReceipt(receipt_id))?;

        if receipt.consumed {
            warn!("[sc-02] Receipt {} already consumed", receipt_id);
            return Err(ReceiptError::AlreadyConsumed(receipt_id));
        }
        if receipt.shard_id != on_shard {
            return Err(ReceiptError::WrongShard {
                receipt_id,
                expected: receipt.shard_id,
                got: on_shard,
            });
        }
        if store.shard_id() != on_shard {
            return Err(ReceiptError::ForeignCaller {
                shard_id: store.shard_id(),
                origin: CallOrigin::ShardExecution(on_shard),
            });
        }

        store.consume(receipt_id, receipt)?;
        self.mark_consumed(receipt_id)?;

        self.get(receipt_id)
            .cloned()
            .ok_or(ReceiptError::UnknownReceipt(receipt_id))
    }

    /// Flip the `consumed` flag after a shard recorded the receipt as used.
    ///
    /// Returns `false` if the flag was already set.
    pub fn mark_consumed(&mut self, receipt_id: ReceiptId) -> ReceiptResult<bool> {
        let receipt = self
            .receipts
            .get_mut(receipt_id as usize)
            .ok_or(ReceiptError::UnknownReceipt(receipt_id))?;
        if receipt.consumed {
            return Ok(false);
        }

        receipt.consumed = true;
        self.escrowed -= receipt.value;
        info!(
            "[sc-02] Receipt {} consumed on shard {}",
            receipt_id, receipt.shard_id
        );
        Ok(true)
    }

    /// Number of receipts created.
    pub fn len(&self) -> usize {
        self.receipts.len()
    }

    /// Whether no receipt was created yet.
    pub fn is_empty(&self) -> bool {
        self.receipts.is_empty()
    }

    /// Value held for unconsumed receipts.
    pub fn escrowed(&self) -> Wei {
        self.escrowed
    }

    /// Number of destination shards.
    pub fn shard_count(&self) -> ShardId {
        self.shard_count
    }
}
