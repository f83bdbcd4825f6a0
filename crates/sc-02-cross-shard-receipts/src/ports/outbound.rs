//! # Outbound Ports
//!
//! Read access to sending-side receipts for destination-shard executors.

use crate::domain::{Receipt, ReceiptLedger};
use shared_types::ReceiptId;

/// Receipt lookup - outbound port.
pub trait ReceiptSource: Send + Sync {
    /// Receipt by id, `None` if it was never created.
    fn receipt(&self, receipt_id: ReceiptId) -> Option<Receipt>;
}

impl ReceiptSource for ReceiptLedger {
    fn receipt(&self, receipt_id: ReceiptId) -> Option<Receipt> {
        self.get(receipt_id).cloned()
    }
}
