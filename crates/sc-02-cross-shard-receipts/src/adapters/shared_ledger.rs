//! Shared Receipt Ledger
//!
//! The validator manager writes receipts; shard executors running on worker
//! threads read them. The ledger sits behind one `RwLock` shared by both.

use crate::domain::{Receipt, ReceiptLedger};
use crate::ports::ReceiptSource;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use shared_types::{ReceiptId, ShardId};
use std::sync::Arc;

/// Cloneable handle to a [`ReceiptLedger`].
#[derive(Clone, Debug)]
pub struct SharedReceiptLedger {
    inner: Arc<RwLock<ReceiptLedger>>,
}

impl SharedReceiptLedger {
    /// Wrap a new, empty ledger.
    pub fn new(shard_count: ShardId) -> Self {
        Self::from_ledger(ReceiptLedger::new(shard_count))
    }

    /// Wrap an existing ledger.
    pub fn from_ledger(ledger: ReceiptLedger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    /// Acquire read access.
    pub fn read(&self) -> RwLockReadGuard<'_, ReceiptLedger> {
        self.inner.read()
    }

    /// Acquire write access.
    pub fn write(&self) -> RwLockWriteGuard<'_, ReceiptLedger> {
        self.inner.write()
    }
}

impl ReceiptSource for SharedReceiptLedger {
    fn receipt(&self, receipt_id: ReceiptId) -> Option<Receipt> {
        self.inner.read().get(receipt_id).cloned()
    }
}
