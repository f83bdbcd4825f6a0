//! # Orphan Flows
//!
//! Headers reach the main chain in order, bodies reach the shard chain in
//! any order. A body whose parent body is missing waits in the parent queue
//! and is re-validated when the parent is accepted.

#[cfg(test)]
mod tests {
    use super::super::harness::Harness;
    use sc_03_shard_chain::{AddCollationOutcome, Collation, CollationStatus, ExecutionError};
    use shared_types::{Hash, GENESIS_HASH};

    /// Three collations of shard 0, one per period, headers recorded, no
    /// bodies delivered.
    fn recorded_chain(h: &mut Harness) -> Vec<Collation> {
        let c1 = h.build(0, GENESIS_HASH, vec![]);
        let mut chain = vec![c1];
        for number in 2..=3 {
            h.node
                .manager_mut()
                .add_header(&chain[chain.len() - 1].header.encode())
                .unwrap();
            h.next_period();
            let parent: Hash = chain[chain.len() - 1].hash();
            chain.push(h.empty_on(0, parent, number));
        }
        h.node
            .manager_mut()
            .add_header(&chain[2].header.encode())
            .unwrap();
        chain
    }

    #[test]
    fn test_bodies_in_reverse_order() {
        let mut h = Harness::new();
        let chain = recorded_chain(&mut h);
        let hashes: Vec<_> = chain.iter().map(|c| c.hash()).collect();
        let mut bodies = chain.into_iter().rev();

        let r3 = h.node.import_collation(bodies.next().unwrap()).unwrap();
        assert_eq!(
            r3.outcome,
            AddCollationOutcome::Deferred {
                hash: hashes[2],
                missing_parent: hashes[1],
            }
        );
        let r2 = h.node.import_collation(bodies.next().unwrap()).unwrap();
        assert!(matches!(r2.outcome, AddCollationOutcome::Deferred { .. }));
        assert_eq!(h.node.shard(0).unwrap().orphan_count(), 2);
        assert_eq!(
            h.node.shard(0).unwrap().status(&hashes[2]),
            CollationStatus::Orphaned
        );

        let r1 = h.node.import_collation(bodies.next().unwrap()).unwrap();
        assert!(r1.outcome.is_accepted());
        let drained: Vec<_> = r1.drained.iter().map(|o| o.hash()).collect();
        assert_eq!(drained, vec![hashes[1], hashes[2]]);
        assert!(r1.drained.iter().all(|o| o.is_accepted()));

        let shard = h.node.shard(0).unwrap();
        assert_eq!(shard.orphan_count(), 0);
        assert_eq!(shard.head(), hashes[2]);
        assert_eq!(shard.head_score(), 3);
    }

    #[test]
    fn test_batch_import_drains_within_shard() {
        let mut h = Harness::new();
        let chain = recorded_chain(&mut h);
        let tip = chain[2].hash();
        let batch: Vec<_> = chain.into_iter().rev().collect();

        let results = h.node.import_collations(batch);
        assert_eq!(results.len(), 3);
        let outcomes: Vec<_> = results
            .iter()
            .map(|(_, r)| r.as_ref().unwrap().outcome.clone())
            .collect();
        assert!(matches!(outcomes[0], AddCollationOutcome::Deferred { .. }));
        assert!(matches!(outcomes[1], AddCollationOutcome::Deferred { .. }));
        assert!(outcomes[2].is_accepted());
        assert_eq!(results[2].1.as_ref().unwrap().drained.len(), 2);
        assert_eq!(h.node.shard(0).unwrap().head(), tip);
    }

    #[test]
    fn test_invalid_parent_rejects_waiting_child() {
        let mut h = Harness::new();
        let mut bad = h.build(0, GENESIS_HASH, vec![]);
        bad.header.post_state_root = [0xEE; 32];
        bad.header.sign(&h.collator).unwrap();
        let bad_hash = bad.hash();
        h.node
            .manager_mut()
            .add_header(&bad.header.encode())
            .unwrap();

        h.next_period();
        let child = h.empty_on(0, bad_hash, 2);
        let child_hash = child.hash();
        let submission = h.submit(child);
        assert!(matches!(
            submission.report.outcome,
            AddCollationOutcome::Deferred { .. }
        ));

        let report = h.node.import_collation(bad).unwrap();
        assert!(matches!(
            report.outcome,
            AddCollationOutcome::Rejected {
                reason: ExecutionError::PostStateRootMismatch { .. },
                ..
            }
        ));
        assert_eq!(report.drained.len(), 1);
        assert_eq!(report.drained[0].hash(), child_hash);

        let shard = h.node.shard(0).unwrap();
        assert_eq!(shard.status(&child_hash), CollationStatus::Invalid);
        assert_eq!(shard.orphan_count(), 0);
        assert_eq!(shard.head(), GENESIS_HASH);
    }

    #[test]
    fn test_stale_orphans_pruned() {
        let mut h = Harness::new();
        let chain = recorded_chain(&mut h);
        let tip = chain[2].clone();
        h.node.import_collation(tip).unwrap();
        assert_eq!(h.node.shard(0).unwrap().orphan_count(), 1);

        let retention = h.node.manager().config().orphan_retention_periods;
        for _ in 0..=retention {
            h.next_period();
        }
        let pruned = h.node.prune_orphans().unwrap();
        assert_eq!(pruned.get(&0), Some(&vec![chain[2].hash()]));
        assert_eq!(
            h.node.shard(0).unwrap().status(&chain[2].hash()),
            CollationStatus::Unknown
        );

        // A pruned body can be delivered again once its ancestry is in place
        h.node.import_collation(chain[0].clone()).unwrap();
        h.node.import_collation(chain[1].clone()).unwrap();
        let report = h.node.import_collation(chain[2].clone()).unwrap();
        assert!(report.outcome.is_accepted());
    }
}
