//! # End-to-End Sharding Flows
//!
//! Validators join, get sampled, sign collations; the main chain records
//! headers and the shard chains run fork choice over the bodies.
//!
//! ## Flows Tested
//!
//! 1. **Registry → Sampler**: deposits, withdrawals and slot reuse change who
//!    gets sampled
//! 2. **Manager → ShardChain**: longest chain wins on both the main chain's
//!    header table and the shard chain
//! 3. **Invalid bodies**: a rejected collation poisons its descendants but
//!    leaves other shards untouched

#[cfg(test)]
mod tests {
    use super::super::harness::{Harness, COINBASE};
    use sc_01_validator_registry::{withdraw_message, EcrecoverValidationCode};
    use sc_03_shard_chain::{AddCollationOutcome, CollationStatus, ExecutionError};
    use sc_04_validator_manager::{
        InMemoryEventBus, InMemoryMainChain, ManagerError, ShardingApi, ShardingNode,
        ShardingService, ValidatorManager,
    };
    use shared_crypto::Secp256k1KeyPair;
    use shared_types::{ProtocolConfig, GENESIS_HASH, ZERO_ADDRESS};
    use std::collections::BTreeSet;
    use std::sync::Arc;

    // =========================================================================
    // FULL FLOW
    // =========================================================================

    /// Deposit, reseed, sample, then grow shard 0 by two collations.
    #[test]
    fn test_deposit_sample_and_extend_shard() {
        let config = ProtocolConfig::for_testing();
        let codes = Arc::new(EcrecoverValidationCode::new());
        let events = Arc::new(InMemoryEventBus::new());
        let mut manager = ValidatorManager::new(
            config.clone(),
            InMemoryMainChain::default(),
            codes.clone(),
            events.clone(),
        );

        // Deposit V
        let key = Secp256k1KeyPair::generate();
        let v = codes.deploy(key.address());
        assert_eq!(manager.deposit(v, key.address(), config.deposit_size), Ok(0));

        // Past one shuffling cycle, V is sampled for shard 0
        manager
            .main_chain_mut()
            .mine_to(config.shuffling_cycle_length + 1);
        assert_eq!(manager.sample(0).unwrap(), v);

        // C1 on genesis: score 1, new head
        let mut node = ShardingNode::new(manager);
        let c1 = node
            .build_collation(0, GENESIS_HASH, vec![], COINBASE, &key)
            .unwrap();
        let c1_hash = c1.hash();
        let submission = node.submit_collation(c1).unwrap();
        assert!(submission.report.outcome.is_accepted());
        assert_eq!(submission.header.head_change, Some((c1_hash, GENESIS_HASH)));
        assert_eq!(
            node.manager().get_collation_headers_score(0, &c1_hash),
            Some(1)
        );
        assert_eq!(node.manager().get_head(0), c1_hash);

        // C2 on C1 in the next period: score 2, new head
        let length = node.manager().config().period_length;
        node.manager_mut().main_chain_mut().mine(length);
        let c2 = node.build_collation(0, c1_hash, vec![], COINBASE, &key).unwrap();
        let c2_hash = c2.hash();
        let submission = node.submit_collation(c2).unwrap();
        assert_eq!(submission.header.head_change, Some((c2_hash, c1_hash)));
        assert_eq!(
            node.manager().get_collation_headers_score(0, &c2_hash),
            Some(2)
        );
        assert_eq!(node.manager().get_head(0), c2_hash);

        let shard = node.shard(0).unwrap();
        assert_eq!(shard.head(), c2_hash);
        assert_eq!(shard.head_score(), 2);
        assert_eq!(events.events_named("change_head").len(), 2);
    }

    // =========================================================================
    // REGISTRY → SAMPLER
    // =========================================================================

    #[test]
    fn test_sampling_follows_registry() {
        let config = ProtocolConfig::for_testing();
        let codes = Arc::new(EcrecoverValidationCode::new());
        let mut manager = ValidatorManager::new(
            config.clone(),
            InMemoryMainChain::default(),
            codes.clone(),
            Arc::new(InMemoryEventBus::new()),
        );

        let keys: Vec<_> = (0..3).map(|_| Secp256k1KeyPair::generate()).collect();
        let deployed: Vec<_> = keys.iter().map(|k| codes.deploy(k.address())).collect();
        for code in &deployed {
            manager.deposit(*code, [1u8; 20], config.deposit_size).unwrap();
        }

        for period in 0..10 {
            manager.main_chain_mut().mine(config.period_length);
            for shard_id in 0..config.shard_count {
                let sampled = manager.sample(shard_id).unwrap();
                assert!(deployed.contains(&sampled), "period {}", period);
            }
        }

        // Withdraw slot 1; its code is never sampled again
        let signature = keys[1].sign_hash(&withdraw_message()).unwrap();
        assert!(manager.withdraw(1, signature.as_bytes()));
        for _ in 0..10 {
            manager.main_chain_mut().mine(config.period_length);
            for shard_id in 0..config.shard_count {
                let sampled = manager.sample(shard_id).unwrap();
                assert_ne!(sampled, deployed[1]);
            }
        }

        // A newcomer reuses the freed slot
        let newcomer = codes.deploy(Secp256k1KeyPair::generate().address());
        assert_eq!(
            manager.deposit(newcomer, [2u8; 20], config.deposit_size),
            Ok(1)
        );
        assert_eq!(manager.registry().occupied_count(), 3);
    }

    #[test]
    fn test_everyone_withdraws_nobody_sampled() {
        let mut h = Harness::new();
        let signature = h.collator.sign_hash(&withdraw_message()).unwrap();
        assert!(h.node.manager_mut().withdraw(0, signature.as_bytes()));

        for shard_id in 0..4 {
            assert_eq!(h.node.manager().sample(shard_id).unwrap(), ZERO_ADDRESS);
        }
        let collation = h.empty_on(0, GENESIS_HASH, 1);
        assert_eq!(
            h.node.submit_collation(collation).unwrap_err(),
            ManagerError::NoCollator(0)
        );
    }

    #[tokio::test]
    async fn test_service_sampling_spreads_over_validators() {
        let config = ProtocolConfig::for_testing();
        let codes = Arc::new(EcrecoverValidationCode::new());
        let manager = ValidatorManager::new(
            config.clone(),
            InMemoryMainChain::default(),
            codes.clone(),
            Arc::new(InMemoryEventBus::new()),
        );
        let service = ShardingService::new(ShardingNode::new(manager));

        let mut deployed = BTreeSet::new();
        for _ in 0..5 {
            let code = codes.deploy(Secp256k1KeyPair::generate().address());
            service
                .deposit(code, [1u8; 20], config.deposit_size)
                .await
                .unwrap();
            deployed.insert(code);
        }

        let mut seen = BTreeSet::new();
        for _ in 0..40 {
            service.write().manager_mut().main_chain_mut().mine(config.period_length);
            for shard_id in 0..service.shard_count() {
                seen.insert(service.sample(shard_id).unwrap());
            }
        }
        assert!(seen.is_subset(&deployed));
        assert!(seen.len() > 1);
    }

    // =========================================================================
    // MANAGER → SHARD CHAIN: FORK CHOICE
    // =========================================================================

    #[test]
    fn test_longer_fork_takes_over() {
        let mut h = Harness::new();

        // Period 1: A1 on genesis
        let a1 = h.build(0, GENESIS_HASH, vec![]);
        let a1_hash = a1.hash();
        h.submit(a1);

        // Period 2: B1 on genesis ties A1, head stays
        h.next_period();
        let b1 = h.build(0, GENESIS_HASH, vec![]);
        let b1_hash = b1.hash();
        let submission = h.submit(b1);
        assert_eq!(submission.header.head_change, None);
        assert_eq!(h.node.manager().get_head(0), a1_hash);
        assert_eq!(h.node.shard(0).unwrap().head(), a1_hash);

        // Period 3: B2 extends B1 and overtakes
        h.next_period();
        let b2 = h.build(0, b1_hash, vec![]);
        let b2_hash = b2.hash();
        let submission = h.submit(b2);
        assert_eq!(submission.header.head_change, Some((b2_hash, a1_hash)));
        assert_eq!(h.node.manager().get_head(0), b2_hash);

        let chain = h.node.shard(0).unwrap();
        assert_eq!(chain.head(), b2_hash);
        assert_eq!(chain.head_score(), 2);
        assert_eq!(chain.status(&a1_hash), CollationStatus::Accepted);
        assert_eq!(h.events.events_named("change_head").len(), 2);
    }

    #[test]
    fn test_head_per_vantage_point() {
        let mut h = Harness::new();
        let vantage_1 = h.node.manager().get_period_start_prevhash(1).unwrap();

        let a1 = h.build(1, GENESIS_HASH, vec![]);
        let a1_hash = a1.hash();
        h.submit(a1);

        h.next_period();
        let vantage_2 = h.node.manager().get_period_start_prevhash(2).unwrap();
        let b1 = h.build(1, GENESIS_HASH, vec![]);
        let b1_hash = b1.hash();
        h.submit(b1);

        let chain = h.node.shard(1).unwrap();
        assert_eq!(chain.head_of(&vantage_1), Some(a1_hash));
        assert_eq!(chain.head_of(&vantage_2), Some(b1_hash));
        // Ties never move the overall head
        assert_eq!(chain.head(), a1_hash);
    }

    #[test]
    fn test_transfers_change_shard_state() {
        let mut h = Harness::new();
        let bob = [0xB0; 20];
        let c1 = h.build(2, GENESIS_HASH, vec![h.transfer(0, bob, 400)]);
        let c1_hash = c1.hash();
        assert!(h.submit(c1).report.outcome.is_accepted());

        h.next_period();
        let c2 = h.build(2, c1_hash, vec![h.transfer(1, bob, 600)]);
        let c2_hash = c2.hash();
        assert!(h.submit(c2).report.outcome.is_accepted());

        assert_eq!(h.balance_at(2, &c1_hash, &bob), 400);
        assert_eq!(h.balance_at(2, &c2_hash, &bob), 1_000);
        assert_eq!(h.balance_at(2, &c2_hash, &COINBASE), 42_000);

        let changed = h.node.shard(2).unwrap().changed_keys(&c2_hash).unwrap();
        assert!(changed.is_some_and(|keys| !keys.is_empty()));
    }

    #[test]
    fn test_other_shards_untouched() {
        let mut h = Harness::new();
        let c = h.build(3, GENESIS_HASH, vec![]);
        h.submit(c);
        for shard_id in 0..3 {
            assert_eq!(h.node.shard(shard_id).unwrap().head(), GENESIS_HASH);
            assert_eq!(h.node.manager().get_head(shard_id), GENESIS_HASH);
        }
    }

    // =========================================================================
    // INVALID BODIES
    // =========================================================================

    #[test]
    fn test_invalid_parent_poisons_child() {
        let mut h = Harness::new();

        // Replayed nonce: the header is fine, the body is not
        let mut bad = h.build(0, GENESIS_HASH, vec![]);
        bad.transactions = vec![h.transfer(5, [0xB0; 20], 1)];
        bad.header.tx_list_root = sc_03_shard_chain::tx_list_root(&bad.transactions);
        bad.header.sign(&h.collator).unwrap();
        let bad_hash = bad.hash();
        let submission = h.submit(bad);
        assert!(matches!(
            submission.report.outcome,
            AddCollationOutcome::Rejected {
                reason: ExecutionError::BadNonce { .. },
                ..
            }
        ));

        // A healthy shard in the same period is unaffected
        let good = h.build(1, GENESIS_HASH, vec![]);
        assert!(h.submit(good).report.outcome.is_accepted());

        h.next_period();
        let child = h.empty_on(0, bad_hash, 2);
        let submission = h.submit(child);
        assert_eq!(
            submission.report.outcome,
            AddCollationOutcome::Rejected {
                hash: submission.report.outcome.hash(),
                reason: ExecutionError::InvalidParent(bad_hash),
            }
        );
        assert_eq!(h.events.events_named("collation_rejected").len(), 2);
        assert_eq!(h.node.shard(0).unwrap().head(), GENESIS_HASH);
    }

    #[test]
    fn test_duplicate_body_is_idempotent() {
        let mut h = Harness::new();
        let c = h.build(2, GENESIS_HASH, vec![]);
        let hash = c.hash();
        h.submit(c.clone());

        // The main chain refuses the second header; the body import is a no-op
        assert!(h.node.submit_collation(c.clone()).is_err());
        let report = h.node.import_collation(c).unwrap();
        assert_eq!(
            report.outcome,
            AddCollationOutcome::Duplicate {
                hash,
                status: CollationStatus::Accepted,
            }
        );
    }
}
