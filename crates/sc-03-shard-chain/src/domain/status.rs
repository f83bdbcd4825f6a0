//! # Collation Status and Outcomes
//!
//! Per-shard state machine over collation hashes:
//!
//! ```text
//! Unknown ──parent missing──▶ Orphaned ──parent accepted──▶ (re-validated)
//!    │                          │
//!    │                          └──evicted / pruned──▶ Unknown
//!    ├──valid──▶ Accepted
//!    └──invalid─▶ Invalid
//! ```

use super::errors::ExecutionError;
use serde::{Deserialize, Serialize};
use shared_types::Hash;

/// Status of a collation hash within one shard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollationStatus {
    /// Never seen, or evicted from the orphan queue.
    Unknown,
    /// Waiting for its parent.
    Orphaned,
    /// Failed validation; persisted for audit, never a head.
    Invalid,
    /// Validated and scored.
    Accepted,
}

impl CollationStatus {
    /// One-byte storage tag.
    pub fn to_byte(self) -> u8 {
        match self {
            CollationStatus::Unknown => 0,
            CollationStatus::Orphaned => 1,
            CollationStatus::Invalid => 2,
            CollationStatus::Accepted => 3,
        }
    }

    /// Parse a storage tag.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(CollationStatus::Unknown),
            1 => Some(CollationStatus::Orphaned),
            2 => Some(CollationStatus::Invalid),
            3 => Some(CollationStatus::Accepted),
            _ => None,
        }
    }
}

/// Result of submitting one collation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AddCollationOutcome {
    /// Validated, persisted and scored.
    Accepted {
        /// Collation hash
        hash: Hash,
        /// Chain-length score
        score: u64,
        /// Head replaced at the submitting vantage point, if any
        head_change: Option<HeadChange>,
    },
    /// Parent unknown; queued until it arrives.
    Deferred {
        /// Collation hash
        hash: Hash,
        /// Parent it waits for
        missing_parent: Hash,
    },
    /// Failed validation; marked invalid.
    Rejected {
        /// Collation hash
        hash: Hash,
        /// Why it failed
        reason: ExecutionError,
    },
    /// Already judged or queued; nothing changed.
    Duplicate {
        /// Collation hash
        hash: Hash,
        /// Existing status
        status: CollationStatus,
    },
}

impl AddCollationOutcome {
    /// Hash of the submitted collation.
    pub fn hash(&self) -> Hash {
        match self {
            AddCollationOutcome::Accepted { hash, .. }
            | AddCollationOutcome::Deferred { hash, .. }
            | AddCollationOutcome::Rejected { hash, .. }
            | AddCollationOutcome::Duplicate { hash, .. } => *hash,
        }
    }

    /// Whether the collation was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, AddCollationOutcome::Accepted { .. })
    }
}

/// Head replacement at one main-chain vantage point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadChange {
    /// Main-chain block the head is perceived from.
    pub vantage: Hash,
    /// New head collation.
    pub new_head: Hash,
    /// Previous head (`GENESIS_HASH` if the shard was empty there).
    pub previous_head: Hash,
}

/// Outcome of a submission plus every queued descendant it unblocked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollationReport {
    /// Outcome for the submitted collation.
    pub outcome: AddCollationOutcome,
    /// Outcomes of orphans drained because of it, in processing order.
    pub drained: Vec<AddCollationOutcome>,
    /// Orphans evicted to make room, now `Unknown` again.
    pub evicted: Vec<Hash>,
}

impl CollationReport {
    /// All outcomes, submission first.
    pub fn outcomes(&self) -> impl Iterator<Item = &AddCollationOutcome> {
        std::iter::once(&self.outcome).chain(self.drained.iter())
    }
}
