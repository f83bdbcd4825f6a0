//! # Domain Entities
//!
//! What the main chain records about collations, and the events it emits
//! for off-chain observers.

use sc_03_shard_chain::CollationReport;
use serde::{Deserialize, Serialize};
use shared_types::{Address, Hash, PeriodNumber, ReceiptId, ShardId, SlotIndex};

/// Main-chain record of one collation header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderRecord {
    /// Shard of the collation.
    pub shard_id: ShardId,
    /// Header hash.
    pub hash: Hash,
    /// Parent header hash (`GENESIS_HASH` for the first collation).
    pub parent_hash: Hash,
    /// Height in the shard chain.
    pub number: u64,
    /// Period the header was added in.
    pub period: PeriodNumber,
    /// Chain-length score on the main chain's view of the shard.
    pub score: u64,
}

/// Result of a successful `add_header`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedHeader {
    /// Recorded header.
    pub record: HeaderRecord,
    /// `(new_head, previous_head)` if the shard head moved.
    pub head_change: Option<(Hash, Hash)>,
}

/// Result of routing one collation through the node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    /// Header as recorded by the main chain.
    pub header: AddedHeader,
    /// Judgement of the shard chain, drained orphans included.
    pub report: CollationReport,
    /// Receipts whose sending-side flag this submission flipped.
    pub settled: Vec<ReceiptId>,
}

/// Events emitted by the validator manager.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManagerEvent {
    /// A collation header was recorded.
    AddHeader {
        /// Shard of the header
        shard_id: ShardId,
        /// Header hash
        hash: Hash,
        /// Raw RLP header
        header: Vec<u8>,
    },
    /// The main chain's head for a shard moved.
    ChangeHead {
        /// Shard whose head moved
        shard_id: ShardId,
        /// New head
        new_head: Hash,
        /// Previous head
        previous_head: Hash,
    },
    /// A validator joined.
    Deposit {
        /// Assigned slot
        slot: SlotIndex,
        /// Validation code of the validator
        validation_code_addr: Address,
        /// Refund address
        return_addr: Address,
    },
    /// A validator left.
    Withdraw {
        /// Freed slot
        slot: SlotIndex,
    },
    /// A cross-shard receipt was created.
    TxToShard {
        /// Receipt id
        receipt_id: ReceiptId,
        /// Destination shard
        shard_id: ShardId,
        /// Recipient on the destination shard
        to: Address,
    },
    /// A receipt was consumed on its destination shard.
    AddUsedReceipt {
        /// Destination shard
        shard_id: ShardId,
        /// Consumed receipt
        receipt_id: ReceiptId,
    },
    /// A shard chain judged a collation invalid.
    CollationRejected {
        /// Shard of the collation
        shard_id: ShardId,
        /// Collation hash
        hash: Hash,
        /// Validation failure
        reason: String,
    },
}

impl ManagerEvent {
    /// Short event name, as observers index it.
    pub fn name(&self) -> &'static str {
        match self {
            ManagerEvent::AddHeader { .. } => "add_header",
            ManagerEvent::ChangeHead { .. } => "change_head",
            ManagerEvent::Deposit { .. } => "deposit",
            ManagerEvent::Withdraw { .. } => "withdraw",
            ManagerEvent::TxToShard { .. } => "tx_to_shard",
            ManagerEvent::AddUsedReceipt { .. } => "add_used_receipt",
            ManagerEvent::CollationRejected { .. } => "collation_rejected",
        }
    }
}
