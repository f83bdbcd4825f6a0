//! # Sharding Node
//!
//! Routes collations between the main-chain manager and the shard chains.
//!
//! ## Flow
//!
//! ```text
//! submit_collation(c)
//!   ├── manager.add_header(rlp(c.header))   main chain records the header
//!   ├── shards[c.shard].add_collation(c)    body judged, orphans drained
//!   └── settle receipts                     consumed receipts flagged on the
//!                                           sending side
//! ```
//!
//! `import_collations` delivers bodies whose headers the main chain already
//! recorded. Shard chains are disjoint, so a batch is validated one worker
//! per shard.

use crate::domain::{ManagerError, ManagerEvent, ManagerResult, Submission};
use crate::manager::ValidatorManager;
use crate::ports::MainChainView;
use rayon::prelude::*;
use sc_03_shard_chain::{
    tx_list_root, AddCollationOutcome, Collation, CollationHeader, CollationReport,
    InMemoryKVStore, InMemoryShardChain, InMemoryStateExecutor, ShardChain, Transaction,
};
use shared_crypto::Secp256k1KeyPair;
use shared_types::{short_hex, Address, Hash, ReceiptId, ShardId, Wei, GENESIS_HASH};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Validator manager plus one shard chain per shard.
pub struct ShardingNode<M: MainChainView> {
    manager: ValidatorManager<M>,
    shards: BTreeMap<ShardId, InMemoryShardChain>,
}

impl<M: MainChainView> ShardingNode<M> {
    /// Node whose shards all start from an empty genesis state.
    pub fn new(manager: ValidatorManager<M>) -> Self {
        Self::with_genesis(manager, &BTreeMap::new())
    }

    /// Node whose shard genesis states hold `balances`.
    pub fn with_genesis(
        manager: ValidatorManager<M>,
        balances: &BTreeMap<ShardId, Vec<(Address, Wei)>>,
    ) -> Self {
        let config = manager.config().clone();
        let receipts = Arc::new(manager.receipts());

        let shards = (0..config.shard_count)
            .map(|shard_id| {
                let genesis = balances.get(&shard_id).cloned().unwrap_or_default();
                let executor = InMemoryStateExecutor::with_genesis_balances(
                    shard_id,
                    &config,
                    receipts.clone(),
                    genesis,
                );
                let mut chain =
                    ShardChain::new(shard_id, &config, InMemoryKVStore::new(), executor);

                let events = manager.events();
                chain.register_invalid_listener(move |collation, reason| {
                    events.publish(ManagerEvent::CollationRejected {
                        shard_id,
                        hash: collation.hash(),
                        reason: reason.to_string(),
                    });
                });
                chain.set_new_head_callback(move |collation, score| {
                    info!(
                        "[sc-04] Shard {} got its first collation {} (score {})",
                        shard_id,
                        short_hex(&collation.hash()),
                        score
                    );
                });
                (shard_id, chain)
            })
            .collect();

        Self { manager, shards }
    }

    /// Build and sign a collation on top of `parent` for the current period.
    ///
    /// `parent` must be a header the main chain recorded (or genesis) whose
    /// body this node accepted, so the post-state root can be computed.
    pub fn build_collation(
        &self,
        shard_id: ShardId,
        parent: Hash,
        transactions: Vec<Transaction>,
        coinbase: Address,
        key: &Secp256k1KeyPair,
    ) -> ManagerResult<Collation> {
        let chain = self.shard(shard_id)?;
        let period = self.manager.current_period();

        let number = if parent == GENESIS_HASH {
            1
        } else {
            self.manager
                .headers()
                .get(shard_id, &parent)
                .ok_or(ManagerError::UnknownParentHeader(parent))?
                .number
                + 1
        };

        let post_state_root = chain
            .prepare_post_state(&parent, &transactions, coinbase)
            .map_err(ManagerError::Execution)?;

        let mut header = CollationHeader {
            shard_id,
            expected_period_number: period,
            period_start_prevhash: self.manager.get_period_start_prevhash(period)?,
            parent_collation_hash: parent,
            tx_list_root: tx_list_root(&transactions),
            coinbase,
            post_state_root,
            // Transaction receipts are not committed to
            receipt_root: [0u8; 32],
            number,
            signature: Vec::new(),
        };
        header.sign(key)?;

        debug!(
            "[sc-04] Built collation #{} for shard {} on {}",
            number,
            shard_id,
            short_hex(&parent)
        );
        Ok(Collation::new(header, transactions))
    }

    /// Record the header on the main chain, then hand the body to its shard.
    ///
    /// A header the main chain rejects never reaches the shard chain.
    pub fn submit_collation(&mut self, collation: Collation) -> ManagerResult<Submission> {
        let shard_id = collation.header.shard_id;
        self.shard(shard_id)?;

        let header = self.manager.add_header(&collation.header.encode())?;
        let vantage = self
            .manager
            .get_period_start_prevhash(header.record.period)?;

        let chain = self
            .shards
            .get_mut(&shard_id)
            .ok_or(ManagerError::InvalidShard(shard_id))?;
        let report = chain.add_collation(collation, vantage)?;
        let settled = settle_receipts(&mut self.manager, chain, &report)?;

        Ok(Submission {
            header,
            report,
            settled,
        })
    }

    /// Deliver the body of a collation whose header is already recorded.
    pub fn import_collation(&mut self, collation: Collation) -> ManagerResult<CollationReport> {
        let shard_id = collation.header.shard_id;
        let vantage = self.vantage_of(&collation)?;
        let chain = self
            .shards
            .get_mut(&shard_id)
            .ok_or(ManagerError::InvalidShard(shard_id))?;
        let report = chain.add_collation(collation, vantage)?;
        settle_receipts(&mut self.manager, chain, &report)?;
        Ok(report)
    }

    /// Deliver a batch of bodies, one worker per shard.
    ///
    /// Within a shard, bodies are judged in batch order. Bodies without a
    /// recorded header are reported first; the rest come back ordered by
    /// shard, then batch order.
    pub fn import_collations(
        &mut self,
        batch: Vec<Collation>,
    ) -> Vec<(Hash, ManagerResult<CollationReport>)> {
        let mut results = Vec::with_capacity(batch.len());
        let mut per_shard: BTreeMap<ShardId, Vec<(Hash, Collation, Hash)>> = BTreeMap::new();

        for collation in batch {
            let hash = collation.hash();
            match self.vantage_of(&collation) {
                Ok(vantage) => per_shard
                    .entry(collation.header.shard_id)
                    .or_default()
                    .push((hash, collation, vantage)),
                Err(e) => results.push((hash, Err(e))),
            }
        }

        let work: Vec<_> = self
            .shards
            .iter_mut()
            .filter_map(|(shard_id, chain)| {
                per_shard.remove(shard_id).map(|items| (chain, items))
            })
            .collect();

        let judged: Vec<(ShardId, Vec<(Hash, ManagerResult<CollationReport>)>)> = work
            .into_par_iter()
            .map(|(chain, items)| {
                let reports = items
                    .into_iter()
                    .map(|(hash, collation, vantage)| {
                        let report = chain
                            .add_collation(collation, vantage)
                            .map_err(ManagerError::from);
                        (hash, report)
                    })
                    .collect();
                (chain.shard_id(), reports)
            })
            .collect();

        for (shard_id, reports) in judged {
            for (hash, report) in reports {
                let settled = match (&report, self.shards.get(&shard_id)) {
                    (Ok(report), Some(chain)) => {
                        settle_receipts(&mut self.manager, chain, report).map(|_| ())
                    }
                    _ => Ok(()),
                };
                results.push((hash, settled.and(report)));
            }
        }
        results
    }

    /// Drop orphans that outlived the retention window; returns them per shard.
    pub fn prune_orphans(&mut self) -> ManagerResult<BTreeMap<ShardId, Vec<Hash>>> {
        let period = self.manager.current_period();
        let mut pruned = BTreeMap::new();
        for (shard_id, chain) in self.shards.iter_mut() {
            let hashes = chain.prune_orphans(period)?;
            if !hashes.is_empty() {
                pruned.insert(*shard_id, hashes);
            }
        }
        Ok(pruned)
    }

    /// Shard chain of `shard_id`.
    pub fn shard(&self, shard_id: ShardId) -> ManagerResult<&InMemoryShardChain> {
        self.shards
            .get(&shard_id)
            .ok_or(ManagerError::InvalidShard(shard_id))
    }

    /// Shard chain of `shard_id`, mutably.
    pub fn shard_mut(&mut self, shard_id: ShardId) -> ManagerResult<&mut InMemoryShardChain> {
        self.shards
            .get_mut(&shard_id)
            .ok_or(ManagerError::InvalidShard(shard_id))
    }

    /// Main-chain manager.
    pub fn manager(&self) -> &ValidatorManager<M> {
        &self.manager
    }

    /// Main-chain manager, mutably.
    pub fn manager_mut(&mut self) -> &mut ValidatorManager<M> {
        &mut self.manager
    }

    /// Vantage block of a collation whose header the main chain recorded.
    fn vantage_of(&self, collation: &Collation) -> ManagerResult<Hash> {
        let shard_id = collation.header.shard_id;
        self.shard(shard_id)?;
        let hash = collation.hash();
        let record = self
            .manager
            .headers()
            .get(shard_id, &hash)
            .ok_or(ManagerError::UnknownHeader(hash))?;
        self.manager.get_period_start_prevhash(record.period)
    }
}

/// Flag the receipts consumed by every accepted collation of `report`.
fn settle_receipts<M: MainChainView>(
    manager: &mut ValidatorManager<M>,
    chain: &InMemoryShardChain,
    report: &CollationReport,
) -> ManagerResult<Vec<ReceiptId>> {
    let mut settled = Vec::new();
    for outcome in report.outcomes() {
        let AddCollationOutcome::Accepted { hash, .. } = outcome else {
            continue;
        };
        let Some(collation) = chain.get_collation(hash)? else {
            continue;
        };
        for tx in &collation.transactions {
            if let Transaction::ReceiptConsuming { receipt_id, .. } = tx {
                if manager.settle_used_receipt(chain.shard_id(), *receipt_id)? {
                    settled.push(*receipt_id);
                }
            }
        }
    }
    Ok(settled)
}
