//! # Shard Chain Service
//!
//! Collation store and fork choice for one shard.
//!
//! ## Architecture
//!
//! The service:
//! 1. Judges each submitted collation `Accepted`, `Invalid` or `Orphaned`
//! 2. Delegates body execution to a [`StateExecutor`]
//! 3. Scores accepted collations with the lazy fill in [`crate::algorithms::score`]
//! 4. Tracks the head per main-chain vantage block and the overall head
//! 5. Drains queued orphans when their parent is accepted
//!
//! Every judgement is one `atomic_batch_write`; in-memory indices are only
//! updated after the batch commits.

use crate::algorithms::{score_child, score_of, ParentQueue, QueuedCollation, ScoreLookup};
use crate::domain::{
    AddCollationOutcome, CodecError, Collation, CollationReport, CollationStatus, ExecutionError,
    HeadChange, ShardChainError, ShardChainResult, Transaction,
};
use crate::ports::{BatchOperation, KeyValueStore, StateExecutor};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{short_hex, Address, Hash, PeriodNumber, ProtocolConfig, ShardId, GENESIS_HASH};
use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, info, warn};

/// Storage key layout.
mod keys {
    use shared_types::Hash;

    fn prefixed(prefix: &[u8], hash: &Hash) -> Vec<u8> {
        [prefix, hash.as_slice()].concat()
    }

    pub fn collation(hash: &Hash) -> Vec<u8> {
        prefixed(b"collation:", hash)
    }

    pub fn status(hash: &Hash) -> Vec<u8> {
        prefixed(b"status:", hash)
    }

    pub fn score(hash: &Hash) -> Vec<u8> {
        prefixed(b"score:", hash)
    }

    pub fn state(hash: &Hash) -> Vec<u8> {
        prefixed(b"state:", hash)
    }

    pub fn changed(hash: &Hash) -> Vec<u8> {
        prefixed(b"changed:", hash)
    }

    pub fn deletes(hash: &Hash) -> Vec<u8> {
        prefixed(b"deletes:", hash)
    }

    pub fn orphan(hash: &Hash) -> Vec<u8> {
        prefixed(b"orphan:", hash)
    }

    pub fn head_of(vantage: &Hash) -> Vec<u8> {
        prefixed(b"head:", vantage)
    }

    pub const HEAD: &[u8] = b"head";
}

fn encode<T: Serialize>(value: &T) -> ShardChainResult<Vec<u8>> {
    Ok(bincode::serialize(value).map_err(CodecError::from)?)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> ShardChainResult<T> {
    Ok(bincode::deserialize(bytes).map_err(CodecError::from)?)
}

/// Callback for collations judged invalid.
pub type InvalidListener = Box<dyn Fn(&Collation, &ExecutionError) + Send + Sync>;

/// Callback for accepted first collations of a shard, with their score.
pub type NewHeadCallback = Box<dyn Fn(&Collation, u64) + Send + Sync>;

struct ScoreView<'a> {
    scores: &'a BTreeMap<Hash, u64>,
    parents: &'a BTreeMap<Hash, Hash>,
}

impl ScoreLookup for ScoreView<'_> {
    fn cached_score(&self, hash: &Hash) -> Option<u64> {
        self.scores.get(hash).copied()
    }

    fn parent_of(&self, hash: &Hash) -> Option<Hash> {
        self.parents.get(hash).copied()
    }
}

/// Collation DAG, scores and fork choice of one shard.
pub struct ShardChain<S: KeyValueStore, E: StateExecutor> {
    shard_id: ShardId,
    store: S,
    executor: E,
    /// `Accepted` and `Invalid` collations; orphans live in `queue`.
    statuses: BTreeMap<Hash, CollationStatus>,
    /// Parent links of accepted collations.
    parents: BTreeMap<Hash, Hash>,
    /// Post-state root of each accepted collation (and genesis).
    post_states: BTreeMap<Hash, Hash>,
    /// Score cache, genesis pre-seeded with 0.
    scores: BTreeMap<Hash, u64>,
    /// Head as perceived from each main-chain block.
    head_of: BTreeMap<Hash, Hash>,
    head: Hash,
    head_score: u64,
    queue: ParentQueue,
    retention: PeriodNumber,
    invalid_listeners: Vec<InvalidListener>,
    new_head_cb: Option<NewHeadCallback>,
}

impl<S: KeyValueStore, E: StateExecutor> ShardChain<S, E> {
    /// Empty shard chain (only genesis known).
    pub fn new(shard_id: ShardId, config: &ProtocolConfig, store: S, executor: E) -> Self {
        let mut scores = BTreeMap::new();
        scores.insert(GENESIS_HASH, 0);
        let mut post_states = BTreeMap::new();
        post_states.insert(GENESIS_HASH, executor.genesis_root());

        Self {
            shard_id,
            store,
            executor,
            statuses: BTreeMap::new(),
            parents: BTreeMap::new(),
            post_states,
            scores,
            head_of: BTreeMap::new(),
            head: GENESIS_HASH,
            head_score: 0,
            queue: ParentQueue::new(config.max_orphans_per_shard),
            retention: config.orphan_retention_periods,
            invalid_listeners: Vec::new(),
            new_head_cb: None,
        }
    }

    /// Register a listener for collations judged invalid.
    pub fn register_invalid_listener<F>(&mut self, listener: F)
    where
        F: Fn(&Collation, &ExecutionError) + Send + Sync + 'static,
    {
        self.invalid_listeners.push(Box::new(listener));
    }

    /// Set the callback fired when a first collation of the shard (one built
    /// on genesis) is accepted.
    pub fn set_new_head_callback<F>(&mut self, callback: F)
    where
        F: Fn(&Collation, u64) + Send + Sync + 'static,
    {
        self.new_head_cb = Some(Box::new(callback));
    }

    /// Submit a collation observed under main-chain block `vantage`
    /// (the period start block it was added under).
    ///
    /// Orphans are not errors: they come back as `Deferred` and are
    /// re-validated when their parent is accepted. `Err` is returned only
    /// for a collation of another shard or a storage failure.
    pub fn add_collation(
        &mut self,
        collation: Collation,
        vantage: Hash,
    ) -> ShardChainResult<CollationReport> {
        if collation.header.shard_id != self.shard_id {
            return Err(ShardChainError::WrongShard {
                expected: self.shard_id,
                got: collation.header.shard_id,
            });
        }

        let hash = collation.hash();
        let status = self.status(&hash);
        if status != CollationStatus::Unknown {
            debug!("[sc-03] Shard {} duplicate {}", self.shard_id, short_hex(&hash));
            return Ok(CollationReport {
                outcome: AddCollationOutcome::Duplicate { hash, status },
                drained: Vec::new(),
                evicted: Vec::new(),
            });
        }

        let parent = collation.header.parent_collation_hash;
        let parent_status = if parent == GENESIS_HASH {
            CollationStatus::Accepted
        } else {
            self.status(&parent)
        };

        let mut evicted = Vec::new();
        let outcome = match parent_status {
            CollationStatus::Accepted => self.process_ready(collation, hash, vantage)?,
            CollationStatus::Invalid => {
                self.mark_invalid(&collation, hash, ExecutionError::InvalidParent(parent))?
            }
            CollationStatus::Orphaned | CollationStatus::Unknown => {
                evicted = self.enqueue(collation, hash, vantage)?;
                AddCollationOutcome::Deferred {
                    hash,
                    missing_parent: parent,
                }
            }
        };

        let drained = match &outcome {
            AddCollationOutcome::Accepted { .. } => self.drain(hash)?,
            AddCollationOutcome::Rejected { .. } => self.invalidate_descendants(hash)?,
            _ => Vec::new(),
        };

        Ok(CollationReport {
            outcome,
            drained,
            evicted,
        })
    }

    /// Install `collation` as head with a score obtained out of band.
    ///
    /// The body is not executed; the executor must already hold the state
    /// at the header's `post_state_root` for children to validate.
    pub fn sync_head(
        &mut self,
        collation: Collation,
        score: u64,
    ) -> ShardChainResult<CollationReport> {
        if collation.header.shard_id != self.shard_id {
            return Err(ShardChainError::WrongShard {
                expected: self.shard_id,
                got: collation.header.shard_id,
            });
        }

        let hash = collation.hash();
        let post_state = collation.header.post_state_root;
        let ops = vec![
            BatchOperation::put(keys::collation(&hash), encode(&collation)?),
            BatchOperation::put(keys::status(&hash), vec![CollationStatus::Accepted.to_byte()]),
            BatchOperation::put(keys::score(&hash), score.to_be_bytes().to_vec()),
            BatchOperation::put(keys::state(&hash), post_state.to_vec()),
            BatchOperation::put(keys::HEAD.to_vec(), hash.to_vec()),
            BatchOperation::delete(keys::orphan(&hash)),
        ];
        self.store.atomic_batch_write(ops)?;

        self.queue.remove(&hash);
        self.statuses.insert(hash, CollationStatus::Accepted);
        self.parents
            .insert(hash, collation.header.parent_collation_hash);
        self.post_states.insert(hash, post_state);
        self.scores.insert(hash, score);
        self.head = hash;
        self.head_score = score;

        info!(
            "[sc-03] Shard {} synced head {} at score {}",
            self.shard_id,
            short_hex(&hash),
            score
        );
        if collation.header.is_first() {
            if let Some(cb) = &self.new_head_cb {
                cb(&collation, score);
            }
        }

        let drained = self.drain(hash)?;
        Ok(CollationReport {
            outcome: AddCollationOutcome::Accepted {
                hash,
                score,
                head_change: None,
            },
            drained,
            evicted: Vec::new(),
        })
    }

    /// Evict orphans whose period is more than `orphan_retention_periods`
    /// behind `current_period`. Evicted hashes return to `Unknown`.
    pub fn prune_orphans(&mut self, current_period: PeriodNumber) -> ShardChainResult<Vec<Hash>> {
        let retention = self.retention;
        let expired = |entry: &QueuedCollation| {
            entry
                .collation
                .header
                .expected_period_number
                .saturating_add(retention)
                < current_period
        };

        let doomed: Vec<Hash> = self
            .queue
            .iter()
            .filter(|entry| expired(*entry))
            .map(|entry| entry.hash)
            .collect();
        if doomed.is_empty() {
            return Ok(Vec::new());
        }

        let ops = doomed
            .iter()
            .flat_map(|h| {
                [
                    BatchOperation::delete(keys::orphan(h)),
                    BatchOperation::delete(keys::status(h)),
                ]
            })
            .collect();
        self.store.atomic_batch_write(ops)?;

        let pruned: Vec<Hash> = self.queue.prune(expired).into_iter().map(|e| e.hash).collect();
        info!(
            "[sc-03] Shard {} pruned {} orphans before period {}",
            self.shard_id,
            pruned.len(),
            current_period
        );
        Ok(pruned)
    }

    /// Score of an accepted collation, filling the cache along the way.
    ///
    /// `None` for collations that are not accepted.
    pub fn get_score(&mut self, hash: &Hash) -> ShardChainResult<Option<u64>> {
        if *hash != GENESIS_HASH && self.status(hash) != CollationStatus::Accepted {
            return Ok(None);
        }

        let view = ScoreView {
            scores: &self.scores,
            parents: &self.parents,
        };
        let fill = score_of(&view, *hash).ok_or(ShardChainError::UnknownCollation(*hash))?;

        if !fill.fills.is_empty() {
            let ops = fill
                .fills
                .iter()
                .map(|(h, s)| BatchOperation::put(keys::score(h), s.to_be_bytes().to_vec()))
                .collect();
            self.store.atomic_batch_write(ops)?;
            self.scores.extend(fill.fills.iter().copied());
        }
        Ok(Some(fill.score))
    }

    /// Root a body would produce on top of accepted collation `parent`.
    ///
    /// Proposers call this to fill in `post_state_root` before signing.
    pub fn prepare_post_state(
        &self,
        parent: &Hash,
        transactions: &[Transaction],
        coinbase: Address,
    ) -> Result<Hash, ExecutionError> {
        let parent_state = self
            .post_states
            .get(parent)
            .ok_or(ExecutionError::UnknownParentState(*parent))?;
        self.executor
            .post_state_root(parent_state, transactions, coinbase)
    }

    /// Status of `hash` in this shard.
    pub fn status(&self, hash: &Hash) -> CollationStatus {
        if let Some(status) = self.statuses.get(hash) {
            *status
        } else if self.queue.contains(hash) {
            CollationStatus::Orphaned
        } else {
            CollationStatus::Unknown
        }
    }

    /// Overall head (`GENESIS_HASH` while the shard is empty).
    pub fn head(&self) -> Hash {
        self.head
    }

    /// Score of the overall head.
    pub fn head_score(&self) -> u64 {
        self.head_score
    }

    /// Head as perceived from main-chain block `vantage`.
    pub fn head_of(&self, vantage: &Hash) -> Option<Hash> {
        self.head_of.get(vantage).copied()
    }

    /// Stored collation (accepted, invalid or orphaned).
    pub fn get_collation(&self, hash: &Hash) -> ShardChainResult<Option<Collation>> {
        let bytes = match self.store.get(&keys::collation(hash))? {
            Some(bytes) => bytes,
            None => match self.store.get(&keys::orphan(hash))? {
                Some(bytes) => {
                    let (collation, _vantage): (Collation, Hash) = decode(&bytes)?;
                    return Ok(Some(collation));
                }
                None => return Ok(None),
            },
        };
        decode(&bytes).map(Some)
    }

    /// Storage keys written by an accepted collation.
    pub fn changed_keys(&self, hash: &Hash) -> ShardChainResult<Option<Vec<Vec<u8>>>> {
        self.store
            .get(&keys::changed(hash))?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    /// Storage keys removed by an accepted collation.
    pub fn deleted_keys(&self, hash: &Hash) -> ShardChainResult<Option<Vec<Vec<u8>>>> {
        self.store
            .get(&keys::deletes(hash))?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    /// Post-state root of an accepted collation.
    pub fn post_state_of(&self, hash: &Hash) -> Option<Hash> {
        self.post_states.get(hash).copied()
    }

    /// Number of queued orphans.
    pub fn orphan_count(&self) -> usize {
        self.queue.len()
    }

    /// Shard this chain belongs to.
    pub fn shard_id(&self) -> ShardId {
        self.shard_id
    }

    /// State executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// State executor, mutably (state import for lazy sync).
    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    /// Backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate and, on success, accept a collation whose parent is accepted.
    fn process_ready(
        &mut self,
        collation: Collation,
        hash: Hash,
        vantage: Hash,
    ) -> ShardChainResult<AddCollationOutcome> {
        let parent = collation.header.parent_collation_hash;

        let Some(parent_state) = self.post_states.get(&parent).copied() else {
            return self.mark_invalid(&collation, hash, ExecutionError::UnknownParentState(parent));
        };
        let Some(parent_score) = self.get_score(&parent)? else {
            return self.mark_invalid(&collation, hash, ExecutionError::InvalidParent(parent));
        };
        if collation.header.number != parent_score + 1 {
            let reason = ExecutionError::Malformed(format!(
                "number {} on parent at height {}",
                collation.header.number, parent_score
            ));
            return self.mark_invalid(&collation, hash, reason);
        }

        let outcome = match self.executor.apply(&parent_state, &collation) {
            Ok(outcome) => outcome,
            Err(reason) => return self.mark_invalid(&collation, hash, reason),
        };

        let view = ScoreView {
            scores: &self.scores,
            parents: &self.parents,
        };
        let fill =
            score_child(&view, parent, hash).ok_or(ShardChainError::UnknownCollation(parent))?;
        let score = fill.score;

        let previous = self.head_of.get(&vantage).copied().unwrap_or(GENESIS_HASH);
        let previous_score = self.scores.get(&previous).copied().unwrap_or(0);
        let head_change = (score > previous_score).then_some(HeadChange {
            vantage,
            new_head: hash,
            previous_head: previous,
        });
        let new_overall_head = score > self.head_score;

        let mut ops = vec![
            BatchOperation::put(keys::collation(&hash), encode(&collation)?),
            BatchOperation::put(keys::status(&hash), vec![CollationStatus::Accepted.to_byte()]),
            BatchOperation::put(keys::state(&hash), outcome.post_state_root.to_vec()),
            BatchOperation::put(keys::changed(&hash), encode(&outcome.changed_keys)?),
            BatchOperation::put(keys::deletes(&hash), encode(&outcome.deleted_keys)?),
            BatchOperation::delete(keys::orphan(&hash)),
        ];
        ops.extend(
            fill.fills
                .iter()
                .map(|(h, s)| BatchOperation::put(keys::score(h), s.to_be_bytes().to_vec())),
        );
        if head_change.is_some() {
            ops.push(BatchOperation::put(keys::head_of(&vantage), hash.to_vec()));
        }
        if new_overall_head {
            ops.push(BatchOperation::put(keys::HEAD.to_vec(), hash.to_vec()));
        }
        self.store.atomic_batch_write(ops)?;

        self.statuses.insert(hash, CollationStatus::Accepted);
        self.parents.insert(hash, parent);
        self.post_states.insert(hash, outcome.post_state_root);
        self.scores.extend(fill.fills.iter().copied());
        if head_change.is_some() {
            self.head_of.insert(vantage, hash);
        }

        info!(
            "[sc-03] Shard {} accepted collation #{} {} (score {}, {} txs)",
            self.shard_id,
            collation.header.number,
            short_hex(&hash),
            score,
            collation.transactions.len()
        );

        if new_overall_head {
            self.head = hash;
            self.head_score = score;
            info!(
                "[sc-03] Shard {} new head {} at score {}",
                self.shard_id,
                short_hex(&hash),
                score
            );
        }
        if collation.header.is_first() {
            if let Some(cb) = &self.new_head_cb {
                cb(&collation, score);
            }
        }

        Ok(AddCollationOutcome::Accepted {
            hash,
            score,
            head_change,
        })
    }

    /// Persist `collation` as `Invalid` and notify listeners.
    fn mark_invalid(
        &mut self,
        collation: &Collation,
        hash: Hash,
        reason: ExecutionError,
    ) -> ShardChainResult<AddCollationOutcome> {
        let ops = vec![
            BatchOperation::put(keys::collation(&hash), encode(collation)?),
            BatchOperation::put(keys::status(&hash), vec![CollationStatus::Invalid.to_byte()]),
            BatchOperation::delete(keys::orphan(&hash)),
        ];
        self.store.atomic_batch_write(ops)?;
        self.statuses.insert(hash, CollationStatus::Invalid);

        warn!(
            "[sc-03] Shard {} rejected collation #{} {}: {}",
            self.shard_id,
            collation.header.number,
            short_hex(&hash),
            reason
        );
        for listener in &self.invalid_listeners {
            listener(collation, &reason);
        }

        Ok(AddCollationOutcome::Rejected { hash, reason })
    }

    /// Queue an orphan; returns the hashes evicted to make room.
    fn enqueue(
        &mut self,
        collation: Collation,
        hash: Hash,
        vantage: Hash,
    ) -> ShardChainResult<Vec<Hash>> {
        let parent = collation.header.parent_collation_hash;

        if self.queue.capacity() == 0 {
            debug!("[sc-03] Shard {} orphan queue disabled, dropping {}", self.shard_id, short_hex(&hash));
            return Ok(vec![hash]);
        }

        let candidates = self.queue.eviction_candidates();
        let mut ops: Vec<BatchOperation> = candidates
            .iter()
            .flat_map(|h| {
                [
                    BatchOperation::delete(keys::orphan(h)),
                    BatchOperation::delete(keys::status(h)),
                ]
            })
            .collect();
        ops.push(BatchOperation::put(
            keys::orphan(&hash),
            encode(&(&collation, vantage))?,
        ));
        ops.push(BatchOperation::put(
            keys::status(&hash),
            vec![CollationStatus::Orphaned.to_byte()],
        ));
        self.store.atomic_batch_write(ops)?;

        let evicted: Vec<Hash> = self
            .queue
            .push(QueuedCollation {
                hash,
                collation,
                vantage,
            })
            .into_iter()
            .map(|e| e.hash)
            .collect();

        debug!(
            "[sc-03] Shard {} queued orphan {} waiting for {} ({} queued)",
            self.shard_id,
            short_hex(&hash),
            short_hex(&parent),
            self.queue.len()
        );
        for h in &evicted {
            warn!("[sc-03] Shard {} evicted orphan {}", self.shard_id, short_hex(h));
        }
        Ok(evicted)
    }

    /// Re-validate every orphan unblocked by accepting `root`, oldest first,
    /// descending through the queue until nothing more is ready.
    fn drain(&mut self, root: Hash) -> ShardChainResult<Vec<AddCollationOutcome>> {
        let mut drained = Vec::new();
        let mut ready = VecDeque::from([root]);

        while let Some(parent) = ready.pop_front() {
            for child in self.queue.take_children(&parent) {
                let outcome = self.process_ready(child.collation, child.hash, child.vantage)?;
                let rejected = matches!(outcome, AddCollationOutcome::Rejected { .. });
                if outcome.is_accepted() {
                    ready.push_back(child.hash);
                }
                drained.push(outcome);
                if rejected {
                    drained.extend(self.invalidate_descendants(child.hash)?);
                }
            }
        }

        if !drained.is_empty() {
            debug!(
                "[sc-03] Shard {} drained {} orphans below {}",
                self.shard_id,
                drained.len(),
                short_hex(&root)
            );
        }
        Ok(drained)
    }

    /// Mark every queued descendant of an invalid collation `Invalid`.
    fn invalidate_descendants(&mut self, root: Hash) -> ShardChainResult<Vec<AddCollationOutcome>> {
        let mut outcomes = Vec::new();
        let mut invalid = VecDeque::from([root]);

        while let Some(parent) = invalid.pop_front() {
            for child in self.queue.take_children(&parent) {
                let outcome = self.mark_invalid(
                    &child.collation,
                    child.hash,
                    ExecutionError::InvalidParent(parent),
                )?;
                invalid.push_back(child.hash);
                outcomes.push(outcome);
            }
        }
        Ok(outcomes)
    }
}
