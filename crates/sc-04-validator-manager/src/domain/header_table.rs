//! # Header Table
//!
//! The main chain's view of every shard: recorded headers, their scores,
//! the head per shard and the last period each shard filled.
//!
//! The table only enforces linkage (parent known, number = parent + 1, one
//! header per period). Period, prevhash and signer checks live in the
//! manager, which has the main chain and the registry at hand.

use super::entities::HeaderRecord;
use super::errors::{ManagerError, ManagerResult};
use shared_types::{Hash, PeriodNumber, ShardId, GENESIS_HASH};
use std::collections::BTreeMap;

/// Recorded collation headers of all shards.
#[derive(Clone, Debug, Default)]
pub struct HeaderTable {
    records: BTreeMap<(ShardId, Hash), HeaderRecord>,
    heads: BTreeMap<ShardId, Hash>,
    last_period: BTreeMap<ShardId, PeriodNumber>,
}

impl HeaderTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that a header could be recorded, returning its score.
    pub fn check(
        &self,
        shard_id: ShardId,
        parent_hash: &Hash,
        number: u64,
        period: PeriodNumber,
    ) -> ManagerResult<u64> {
        let (parent_number, parent_score) = if *parent_hash == GENESIS_HASH {
            (0, 0)
        } else {
            let parent = self
                .get(shard_id, parent_hash)
                .ok_or(ManagerError::UnknownParentHeader(*parent_hash))?;
            (parent.number, parent.score)
        };

        if number != parent_number + 1 {
            return Err(ManagerError::WrongNumber {
                expected: parent_number + 1,
                got: number,
            });
        }

        if let Some(last) = self.last_period.get(&shard_id) {
            if *last >= period {
                return Err(ManagerError::PeriodAlreadyFilled { shard_id, period });
            }
        }

        Ok(parent_score + 1)
    }

    /// Record a checked header; returns `(new_head, previous_head)` if the
    /// shard head moved.
    pub fn insert(&mut self, record: HeaderRecord) -> Option<(Hash, Hash)> {
        let previous = self.head(record.shard_id);
        let previous_score = self.score(record.shard_id, &previous).unwrap_or(0);

        self.last_period.insert(record.shard_id, record.period);
        let head_change = (record.score > previous_score).then(|| {
            self.heads.insert(record.shard_id, record.hash);
            (record.hash, previous)
        });
        self.records.insert((record.shard_id, record.hash), record);
        head_change
    }

    /// Record of a header.
    pub fn get(&self, shard_id: ShardId, hash: &Hash) -> Option<&HeaderRecord> {
        self.records.get(&(shard_id, *hash))
    }

    /// Score of a recorded header (`0` for genesis).
    pub fn score(&self, shard_id: ShardId, hash: &Hash) -> Option<u64> {
        if *hash == GENESIS_HASH {
            return Some(0);
        }
        self.get(shard_id, hash).map(|r| r.score)
    }

    /// Head of the shard (`GENESIS_HASH` until the first header).
    pub fn head(&self, shard_id: ShardId) -> Hash {
        self.heads.get(&shard_id).copied().unwrap_or(GENESIS_HASH)
    }

    /// Last period the shard recorded a header in.
    pub fn last_period(&self, shard_id: ShardId) -> Option<PeriodNumber> {
        self.last_period.get(&shard_id).copied()
    }

    /// Number of recorded headers.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no header was recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
