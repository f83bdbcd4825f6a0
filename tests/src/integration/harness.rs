//! Shared fixture: a node with one validator (sampled on every shard) and a
//! user funded on every shard.

#![allow(dead_code)]

use sc_01_validator_registry::EcrecoverValidationCode;
use sc_02_cross_shard_receipts::ReceiptRequest;
use sc_03_shard_chain::{
    tx_list_root, Collation, CollationHeader, StateExecutor, Transaction, UnsignedTransaction,
};
use sc_04_validator_manager::{
    InMemoryEventBus, InMemoryMainChain, ShardingNode, Submission, ValidatorManager,
};
use shared_crypto::Secp256k1KeyPair;
use shared_types::{Address, Hash, ProtocolConfig, ReceiptId, ShardId, Wei};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const COINBASE: Address = [0xC0; 20];
pub const ALICE_FUNDS: Wei = 1_000_000_000;

pub struct Harness {
    pub node: ShardingNode<InMemoryMainChain>,
    pub events: Arc<InMemoryEventBus>,
    pub codes: Arc<EcrecoverValidationCode>,
    pub collator: Secp256k1KeyPair,
    pub alice: Secp256k1KeyPair,
}

impl Harness {
    /// Node in period 1 with its validator deposited.
    pub fn new() -> Self {
        let config = ProtocolConfig::for_testing();
        let codes = Arc::new(EcrecoverValidationCode::new());
        let events = Arc::new(InMemoryEventBus::new());
        let collator = Secp256k1KeyPair::generate();
        let alice = Secp256k1KeyPair::generate();

        let mut manager = ValidatorManager::new(
            config.clone(),
            InMemoryMainChain::default(),
            codes.clone(),
            events.clone(),
        );
        let code = codes.deploy(collator.address());
        manager
            .deposit(code, collator.address(), config.deposit_size)
            .unwrap();

        let balances: BTreeMap<ShardId, Vec<(Address, Wei)>> = (0..config.shard_count)
            .map(|shard_id| (shard_id, vec![(alice.address(), ALICE_FUNDS)]))
            .collect();

        let mut harness = Self {
            node: ShardingNode::with_genesis(manager, &balances),
            events,
            codes,
            collator,
            alice,
        };
        harness.next_period();
        harness
    }

    pub fn next_period(&mut self) {
        let length = self.node.manager().config().period_length;
        self.node.manager_mut().main_chain_mut().mine(length);
    }

    /// Collation built by the node on an accepted parent.
    pub fn build(&self, shard_id: ShardId, parent: Hash, txs: Vec<Transaction>) -> Collation {
        self.node
            .build_collation(shard_id, parent, txs, COINBASE, &self.collator)
            .unwrap()
    }

    pub fn submit(&mut self, collation: Collation) -> Submission {
        self.node.submit_collation(collation).unwrap()
    }

    /// Empty collation signed without consulting the parent state.
    ///
    /// Empty bodies never change state, so on a chain of empty collations
    /// the post-state root is the genesis root.
    pub fn empty_on(&self, shard_id: ShardId, parent: Hash, number: u64) -> Collation {
        let manager = self.node.manager();
        let period = manager.current_period();
        let genesis_root = self.node.shard(shard_id).unwrap().executor().genesis_root();
        let mut header = CollationHeader {
            shard_id,
            expected_period_number: period,
            period_start_prevhash: manager.get_period_start_prevhash(period).unwrap(),
            parent_collation_hash: parent,
            tx_list_root: tx_list_root(&[]),
            coinbase: COINBASE,
            post_state_root: genesis_root,
            receipt_root: [0u8; 32],
            number,
            signature: vec![],
        };
        header.sign(&self.collator).unwrap();
        Collation::new(header, vec![])
    }

    /// Signed transfer from alice.
    pub fn transfer(&self, nonce: u64, to: Address, value: Wei) -> Transaction {
        UnsignedTransaction {
            nonce,
            gasprice: 1,
            startgas: 21_000,
            to,
            value,
            data: vec![],
        }
        .sign(&self.alice)
        .unwrap()
    }

    /// Receipt from alice to `to` on `shard_id`.
    pub fn receipt(&mut self, shard_id: ShardId, to: Address, value: Wei) -> ReceiptId {
        let sender = self.alice.address();
        self.node
            .manager_mut()
            .tx_to_shard(ReceiptRequest {
                sender,
                shard_id,
                to,
                startgas: 21_000,
                gasprice: 1,
                data: vec![],
                value,
            })
            .unwrap()
    }

    /// Balance of `address` in the post-state of accepted collation `hash`.
    pub fn balance_at(&self, shard_id: ShardId, hash: &Hash, address: &Address) -> Wei {
        let chain = self.node.shard(shard_id).unwrap();
        let root = chain.post_state_of(hash).unwrap();
        chain.executor().state(&root).unwrap().balance(address)
    }
}
