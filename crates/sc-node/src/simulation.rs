//! # Deterministic Simulation
//!
//! Drives one node through a number of periods:
//!
//! 1. Validators deposit with freshly deployed validation codes
//! 2. Each period the main chain advances `period_length` blocks
//! 3. One cross-shard receipt is created per period
//! 4. The sampled collator of every shard builds a collation carrying a
//!    transfer plus any receipts waiting for that shard, and submits it
//! 5. Expired orphans are pruned
//!
//! Keys, salts and receipt routes come from a seeded RNG, so two runs with
//! the same configuration produce identical heads.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sc_01_validator_registry::EcrecoverValidationCode;
use sc_02_cross_shard_receipts::ReceiptRequest;
use sc_03_shard_chain::{AddCollationOutcome, Transaction, UnsignedTransaction};
use sc_04_validator_manager::{
    InMemoryEventBus, InMemoryMainChain, ShardingApi, ShardingNode, ShardingService,
    ValidatorManager,
};
use serde::Serialize;
use shared_crypto::Secp256k1KeyPair;
use shared_types::{Address, ProtocolConfig, ReceiptId, ShardId, Wei, ZERO_ADDRESS};
use std::collections::BTreeMap;
use std::env;
use std::sync::Arc;
use tracing::{debug, info};

/// Genesis balance of each shard's user account.
const USER_FUNDS: Wei = 1_000_000_000_000;

/// Gas every simulated transaction and receipt carries.
const TX_GAS: u64 = 21_000;

/// Simulation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Validators that deposit before the first period.
    pub validators: usize,
    /// Periods to run.
    pub periods: u64,
    /// RNG seed.
    pub seed: u64,
    /// Value of each transfer and receipt.
    pub transfer_value: Wei,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            validators: 8,
            periods: 10,
            seed: 7,
            transfer_value: 1_000,
        }
    }
}

impl SimulationConfig {
    /// Create configuration from environment variables.
    ///
    /// - `SC_SIM_VALIDATORS` (default: 8)
    /// - `SC_SIM_PERIODS` (default: 10)
    /// - `SC_SIM_SEED` (default: 7)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            validators: env_or("SC_SIM_VALIDATORS", defaults.validators),
            periods: env_or("SC_SIM_PERIODS", defaults.periods),
            seed: env_or("SC_SIM_SEED", defaults.seed),
            ..defaults
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Head of one shard at the end of the run.
#[derive(Debug, Clone, Serialize)]
pub struct ShardHead {
    /// Head hash, hex encoded.
    pub hash: String,
    /// Chain-length score.
    pub score: u64,
}

/// What happened during the run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimulationSummary {
    /// Periods run.
    pub periods: u64,
    /// Validators deposited.
    pub validators: usize,
    /// Collations accepted by their shard chain.
    pub collations_accepted: u64,
    /// Collations the shard chain judged invalid.
    pub collations_rejected: u64,
    /// Shard-periods without a sampled collator.
    pub skipped: u64,
    /// Receipts created.
    pub receipts_created: u64,
    /// Receipts consumed and settled.
    pub receipts_settled: u64,
    /// Orphans pruned.
    pub orphans_pruned: u64,
    /// Events emitted by the manager.
    pub events: usize,
    /// Final head per shard.
    pub heads: BTreeMap<ShardId, ShardHead>,
}

struct User {
    key: Secp256k1KeyPair,
    nonce: u64,
}

/// One simulated node and its actors.
pub struct Simulation {
    config: SimulationConfig,
    protocol: ProtocolConfig,
    service: ShardingService<InMemoryMainChain>,
    codes: Arc<EcrecoverValidationCode>,
    events: Arc<InMemoryEventBus>,
    collators: BTreeMap<Address, Secp256k1KeyPair>,
    users: BTreeMap<ShardId, User>,
    pending: BTreeMap<ShardId, Vec<ReceiptId>>,
    rng: StdRng,
    summary: SimulationSummary,
}

impl Simulation {
    /// Set up a node with one funded user per shard.
    pub fn new(protocol: ProtocolConfig, config: SimulationConfig) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(config.seed);

        let mut users = BTreeMap::new();
        let mut balances = BTreeMap::new();
        for shard_id in 0..protocol.shard_count {
            let key = random_key(&mut rng)?;
            balances.insert(shard_id, vec![(key.address(), USER_FUNDS)]);
            users.insert(shard_id, User { key, nonce: 0 });
        }

        let codes = Arc::new(EcrecoverValidationCode::new());
        let events = Arc::new(InMemoryEventBus::new());
        let manager = ValidatorManager::new(
            protocol.clone(),
            InMemoryMainChain::new(rng.gen()),
            codes.clone(),
            events.clone(),
        );
        let service = ShardingService::new(ShardingNode::with_genesis(manager, &balances));

        Ok(Self {
            config,
            protocol,
            service,
            codes,
            events,
            collators: BTreeMap::new(),
            users,
            pending: BTreeMap::new(),
            rng,
            summary: SimulationSummary::default(),
        })
    }

    /// Run every period and return the summary.
    pub async fn run(mut self) -> Result<SimulationSummary> {
        self.join_validators().await?;

        for _ in 0..self.config.periods {
            self.advance_period();
            let period = self.service.current_period();

            self.send_receipt().await?;
            for shard_id in 0..self.protocol.shard_count {
                self.propose(shard_id).await?;
            }

            let pruned = self.service.write().prune_orphans()?;
            self.summary.orphans_pruned += pruned.values().map(|v| v.len() as u64).sum::<u64>();
            self.summary.periods += 1;
            info!(
                "[sc-node] Period {} done: {} accepted, {} rejected so far",
                period, self.summary.collations_accepted, self.summary.collations_rejected
            );
        }

        self.finish()
    }

    async fn join_validators(&mut self) -> Result<()> {
        for _ in 0..self.config.validators {
            let key = random_key(&mut self.rng)?;
            let code = self.codes.deploy(key.address());
            self.service
                .deposit(code, key.address(), self.protocol.deposit_size)
                .await?;
            self.collators.insert(code, key);
        }
        self.summary.validators = self.collators.len();
        Ok(())
    }

    fn advance_period(&mut self) {
        self.service
            .write()
            .manager_mut()
            .main_chain_mut()
            .mine(self.protocol.period_length);
    }

    async fn send_receipt(&mut self) -> Result<()> {
        let shard_count = self.protocol.shard_count;
        let from = self.rng.gen_range(0..shard_count);
        let to = if shard_count > 1 {
            (from + self.rng.gen_range(1..shard_count)) % shard_count
        } else {
            from
        };

        let sender = self.user(from)?.key.address();
        let recipient = self.user(to)?.key.address();
        let receipt_id = self
            .service
            .tx_to_shard(ReceiptRequest {
                sender,
                shard_id: to,
                to: recipient,
                startgas: TX_GAS,
                gasprice: 1,
                data: Vec::new(),
                value: self.config.transfer_value,
            })
            .await?;

        self.pending.entry(to).or_default().push(receipt_id);
        self.summary.receipts_created += 1;
        debug!("[sc-node] Receipt {} from shard {} to {}", receipt_id, from, to);
        Ok(())
    }

    async fn propose(&mut self, shard_id: ShardId) -> Result<()> {
        let collator = self.service.sample(shard_id)?;
        if collator == ZERO_ADDRESS {
            self.summary.skipped += 1;
            return Ok(());
        }
        let key = self
            .collators
            .get(&collator)
            .context("sampled validation code has no known signer")?;

        let user = self.user(shard_id)?;
        let mut transactions = vec![UnsignedTransaction {
            nonce: user.nonce,
            gasprice: 1,
            startgas: TX_GAS,
            to: key.address(),
            value: self.config.transfer_value,
            data: Vec::new(),
        }
        .sign(&user.key)?];
        transactions.extend(
            self.pending
                .remove(&shard_id)
                .unwrap_or_default()
                .into_iter()
                .map(|receipt_id| Transaction::ReceiptConsuming {
                    shard_id,
                    receipt_id,
                }),
        );

        let (parent, _) = self.service.shard_head(shard_id)?;
        let collation = self.service.read().build_collation(
            shard_id,
            parent,
            transactions,
            key.address(),
            key,
        )?;
        let submission = self.service.submit_collation(collation).await?;

        match submission.report.outcome {
            AddCollationOutcome::Accepted { .. } => {
                self.summary.collations_accepted += 1;
                if let Some(user) = self.users.get_mut(&shard_id) {
                    user.nonce += 1;
                }
            }
            AddCollationOutcome::Rejected { .. } => self.summary.collations_rejected += 1,
            AddCollationOutcome::Deferred { .. } | AddCollationOutcome::Duplicate { .. } => {}
        }
        self.summary.receipts_settled += submission.settled.len() as u64;
        Ok(())
    }

    fn user(&self, shard_id: ShardId) -> Result<&User> {
        self.users
            .get(&shard_id)
            .with_context(|| format!("no user on shard {}", shard_id))
    }

    fn finish(mut self) -> Result<SimulationSummary> {
        for shard_id in 0..self.protocol.shard_count {
            let (hash, score) = self.service.shard_head(shard_id)?;
            self.summary.heads.insert(
                shard_id,
                ShardHead {
                    hash: hex::encode(hash),
                    score,
                },
            );
        }
        self.summary.events = self.events.event_count();
        Ok(self.summary)
    }
}

fn random_key(rng: &mut StdRng) -> Result<Secp256k1KeyPair> {
    Ok(Secp256k1KeyPair::from_bytes(rng.gen())?)
}
