//! # In-Memory State Executor
//!
//! Reference [`StateExecutor`] for simulations and tests. A shard state is
//! balances, nonces and the shard's own [`UsedReceiptStore`]. One state
//! version is retained per post-state root, so sibling collations on
//! different forks each execute against their own parent.
//!
//! ## Validation Order
//!
//! 1. Transaction count bound
//! 2. `tx_list_root` commitment
//! 3. Parent state known
//! 4. Sum of `startgas` within the collation gas limit
//! 5. Per transaction: signature, nonce and balance (signed), or shard and
//!    at-most-once consumption (receipt-consuming)
//! 6. Computed root equals the header's `post_state_root`

use crate::domain::{Collation, ExecutionError, Transaction};
use crate::ports::{ExecutionOutcome, StateExecutor};
use sc_02_cross_shard_receipts::{ReceiptSource, UsedReceiptStore};
use serde::{Deserialize, Serialize};
use shared_crypto::Keccak256Hasher;
use shared_types::{Address, Hash, ProtocolConfig, ShardId, Wei};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Account state of one shard at one post-state root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardState {
    balances: BTreeMap<Address, Wei>,
    nonces: BTreeMap<Address, u64>,
    used_receipts: UsedReceiptStore,
}

impl ShardState {
    /// Empty state for `shard_id`.
    pub fn new(shard_id: ShardId) -> Self {
        Self {
            balances: BTreeMap::new(),
            nonces: BTreeMap::new(),
            used_receipts: UsedReceiptStore::new(shard_id),
        }
    }

    /// Balance of `address` (zero if absent).
    pub fn balance(&self, address: &Address) -> Wei {
        self.balances.get(address).copied().unwrap_or(0)
    }

    /// Next nonce of `address`.
    pub fn nonce(&self, address: &Address) -> u64 {
        self.nonces.get(address).copied().unwrap_or(0)
    }

    /// Receipts consumed on this fork of the shard.
    pub fn used_receipts(&self) -> &UsedReceiptStore {
        &self.used_receipts
    }

    /// Credit `amount` to `address`.
    pub fn credit(&mut self, address: Address, amount: Wei) {
        if amount == 0 {
            return;
        }
        let balance = self.balances.entry(address).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Commitment over every account and consumed receipt.
    pub fn root(&self) -> Hash {
        let mut hasher = Keccak256Hasher::new();
        hasher.update(&self.used_receipts.shard_id().to_be_bytes());
        for (address, balance) in &self.balances {
            hasher.update(b"b").update(address).update(&balance.to_be_bytes());
        }
        for (address, nonce) in &self.nonces {
            hasher.update(b"n").update(address).update(&nonce.to_be_bytes());
        }
        for receipt_id in self.used_receipts.iter() {
            hasher.update(b"r").update(&receipt_id.to_be_bytes());
        }
        hasher.finalize()
    }

    fn prune_empty(&mut self) {
        self.balances.retain(|_, balance| *balance > 0);
    }
}

fn balance_key(address: &Address) -> Vec<u8> {
    [b"balance:".as_slice(), address.as_slice()].concat()
}

fn nonce_key(address: &Address) -> Vec<u8> {
    [b"nonce:".as_slice(), address.as_slice()].concat()
}

fn receipt_key(receipt_id: u64) -> Vec<u8> {
    [b"receipt:".as_slice(), &receipt_id.to_be_bytes()].concat()
}

/// Keys written and removed going from `before` to `after`.
fn diff(before: &ShardState, after: &ShardState) -> (Vec<Vec<u8>>, Vec<Vec<u8>>) {
    let mut changed = Vec::new();
    let mut deleted = Vec::new();

    for (address, balance) in &after.balances {
        if before.balances.get(address) != Some(balance) {
            changed.push(balance_key(address));
        }
    }
    for address in before.balances.keys() {
        if !after.balances.contains_key(address) {
            deleted.push(balance_key(address));
        }
    }
    for (address, nonce) in &after.nonces {
        if before.nonces.get(address) != Some(nonce) {
            changed.push(nonce_key(address));
        }
    }
    for receipt_id in after.used_receipts.iter() {
        if !before.used_receipts.get_used_receipts(*receipt_id) {
            changed.push(receipt_key(*receipt_id));
        }
    }
    (changed, deleted)
}

/// Fork-aware executor over [`ShardState`].
pub struct InMemoryStateExecutor {
    shard_id: ShardId,
    gas_limit: u64,
    max_txs: usize,
    receipts: Arc<dyn ReceiptSource>,
    genesis_root: Hash,
    states: BTreeMap<Hash, ShardState>,
}

impl InMemoryStateExecutor {
    /// Executor for `shard_id` starting from an empty genesis state.
    pub fn new(shard_id: ShardId, config: &ProtocolConfig, receipts: Arc<dyn ReceiptSource>) -> Self {
        Self::with_genesis_balances(shard_id, config, receipts, std::iter::empty())
    }

    /// Executor whose genesis state holds `balances`.
    pub fn with_genesis_balances(
        shard_id: ShardId,
        config: &ProtocolConfig,
        receipts: Arc<dyn ReceiptSource>,
        balances: impl IntoIterator<Item = (Address, Wei)>,
    ) -> Self {
        let mut genesis = ShardState::new(shard_id);
        for (address, amount) in balances {
            genesis.credit(address, amount);
        }
        let genesis_root = genesis.root();

        let mut states = BTreeMap::new();
        states.insert(genesis_root, genesis);

        Self {
            shard_id,
            gas_limit: config.collation_gas_limit,
            max_txs: config.max_txs_per_collation,
            receipts,
            genesis_root,
            states,
        }
    }

    /// Install a state obtained out of band (lazy sync).
    pub fn import_state(&mut self, state: ShardState) -> Hash {
        let root = state.root();
        self.states.insert(root, state);
        root
    }

    /// State at `root`, if retained.
    pub fn state(&self, root: &Hash) -> Option<&ShardState> {
        self.states.get(root)
    }

    /// Shard this executor runs.
    pub fn shard_id(&self) -> ShardId {
        self.shard_id
    }

    fn execute(
        &self,
        parent_state: &Hash,
        transactions: &[Transaction],
        coinbase: Address,
    ) -> Result<(ShardState, ExecutionOutcome), ExecutionError> {
        if transactions.len() > self.max_txs {
            return Err(ExecutionError::TooManyTransactions {
                count: transactions.len(),
                max: self.max_txs,
            });
        }

        let parent = self
            .states
            .get(parent_state)
            .ok_or(ExecutionError::UnknownParentState(*parent_state))?;

        let requested = transactions
            .iter()
            .map(|tx| match tx {
                Transaction::Signed { startgas, .. } => *startgas,
                Transaction::ReceiptConsuming { receipt_id, .. } => self
                    .receipts
                    .receipt(*receipt_id)
                    .map(|r| r.startgas)
                    .unwrap_or(0),
            })
            .fold(0u64, u64::saturating_add);
        if requested > self.gas_limit {
            return Err(ExecutionError::GasLimitExceeded {
                used: requested,
                limit: self.gas_limit,
            });
        }

        let mut state = parent.clone();
        let mut outcome = ExecutionOutcome::default();

        for (index, tx) in transactions.iter().enumerate() {
            match tx {
                Transaction::Signed {
                    nonce,
                    gasprice,
                    startgas,
                    to,
                    value,
                    ..
                } => {
                    let sender = match tx.sender() {
                        Some(Ok(sender)) => sender,
                        _ => return Err(ExecutionError::BadSignature { index }),
                    };

                    let expected = state.nonce(&sender);
                    if *nonce != expected {
                        return Err(ExecutionError::BadNonce {
                            index,
                            expected,
                            got: *nonce,
                        });
                    }

                    let fee = Wei::from(*startgas) * Wei::from(*gasprice);
                    let cost = value
                        .checked_add(fee)
                        .ok_or(ExecutionError::InsufficientBalance { index })?;
                    let balance = state.balance(&sender);
                    if balance < cost {
                        return Err(ExecutionError::InsufficientBalance { index });
                    }

                    state.balances.insert(sender, balance - cost);
                    state.nonces.insert(sender, expected + 1);
                    state.credit(*to, *value);
                    state.credit(coinbase, fee);
                    outcome.gas_used += startgas;
                }
                Transaction::ReceiptConsuming {
                    shard_id,
                    receipt_id,
                } => {
                    if *shard_id != self.shard_id {
                        return Err(ExecutionError::WrongShard {
                            index,
                            expected: self.shard_id,
                            got: *shard_id,
                        });
                    }
                    let receipt = self.receipts.receipt(*receipt_id).ok_or(
                        ExecutionError::UnknownReceipt {
                            index,
                            receipt_id: *receipt_id,
                        },
                    )?;
                    state
                        .used_receipts
                        .consume(*receipt_id, &receipt)
                        .map_err(|source| ExecutionError::Receipt { index, source })?;

                    state.credit(receipt.to, receipt.value);
                    outcome.consumed_receipts.push(*receipt_id);
                    outcome.gas_used += receipt.startgas;
                }
            }
        }

        state.prune_empty();
        let (changed, deleted) = diff(parent, &state);
        outcome.changed_keys = changed;
        outcome.deleted_keys = deleted;
        outcome.post_state_root = state.root();
        Ok((state, outcome))
    }
}

impl StateExecutor for InMemoryStateExecutor {
    fn genesis_root(&self) -> Hash {
        self.genesis_root
    }

    fn apply(
        &mut self,
        parent_state: &Hash,
        collation: &Collation,
    ) -> Result<ExecutionOutcome, ExecutionError> {
        if !collation.body_matches_header() {
            return Err(ExecutionError::TxListRootMismatch);
        }

        let (state, outcome) = self.execute(
            parent_state,
            &collation.transactions,
            collation.header.coinbase,
        )?;

        if outcome.post_state_root != collation.header.post_state_root {
            warn!(
                "[sc-03] Shard {} post-state mismatch for collation #{}",
                self.shard_id, collation.header.number
            );
            return Err(ExecutionError::PostStateRootMismatch {
                expected: collation.header.post_state_root,
                computed: outcome.post_state_root,
            });
        }

        debug!(
            "[sc-03] Shard {} executed {} txs, gas {}",
            self.shard_id,
            collation.transactions.len(),
            outcome.gas_used
        );
        self.states.insert(outcome.post_state_root, state);
        Ok(outcome)
    }

    fn post_state_root(
        &self,
        parent_state: &Hash,
        transactions: &[Transaction],
        coinbase: Address,
    ) -> Result<Hash, ExecutionError> {
        self.execute(parent_state, transactions, coinbase)
            .map(|(_, outcome)| outcome.post_state_root)
    }
}
