//! # Cross-Shard Receipt Flows
//!
//! `tx_to_shard` on the main chain escrows value as a receipt; a
//! receipt-consuming transaction on the destination shard credits it and
//! records the id in that fork's used-receipt set; settlement then flips the
//! sending-side flag.
//!
//! ## Flows Tested
//!
//! 1. Receipt created, consumed, credited and settled
//! 2. Double consumption on one fork is refused
//! 3. Consumption on the wrong shard is refused
//! 4. Sibling forks consume independently; the flag flips once

#[cfg(test)]
mod tests {
    use super::super::harness::Harness;
    use sc_02_cross_shard_receipts::ReceiptError;
    use sc_03_shard_chain::{ExecutionError, Transaction};
    use sc_04_validator_manager::{ManagerError, ManagerEvent};
    use shared_types::GENESIS_HASH;

    const CAROL: [u8; 20] = [0xCA; 20];

    fn consume(shard_id: u32, receipt_id: u64) -> Transaction {
        Transaction::ReceiptConsuming {
            shard_id,
            receipt_id,
        }
    }

    #[test]
    fn test_receipt_round_trip() {
        let mut h = Harness::new();
        let receipt_id = h.receipt(2, CAROL, 500);
        assert_eq!(h.node.manager().get_receipts_value(receipt_id), Some(500));
        assert_eq!(
            h.node.manager().receipts().read().escrowed(),
            500
        );

        let c = h.build(2, GENESIS_HASH, vec![consume(2, receipt_id)]);
        let hash = c.hash();
        let submission = h.submit(c);

        assert!(submission.report.outcome.is_accepted());
        assert_eq!(submission.settled, vec![receipt_id]);
        assert_eq!(h.balance_at(2, &hash, &CAROL), 500);
        assert!(h.node.manager().get_receipt(receipt_id).unwrap().consumed);
        assert_eq!(h.node.manager().receipts().read().escrowed(), 0);

        let used: Vec<_> = h.events.events_named("add_used_receipt");
        assert_eq!(
            used,
            vec![ManagerEvent::AddUsedReceipt {
                shard_id: 2,
                receipt_id
            }]
        );
    }

    #[test]
    fn test_double_consumption_on_one_fork_refused() {
        let mut h = Harness::new();
        let receipt_id = h.receipt(1, CAROL, 50);
        let c1 = h.build(1, GENESIS_HASH, vec![consume(1, receipt_id)]);
        let c1_hash = c1.hash();
        h.submit(c1);

        h.next_period();
        let err = h
            .node
            .build_collation(
                1,
                c1_hash,
                vec![consume(1, receipt_id)],
                [0xC0; 20],
                &h.collator,
            )
            .unwrap_err();
        assert_eq!(
            err,
            ManagerError::Execution(ExecutionError::Receipt {
                index: 0,
                source: ReceiptError::AlreadyConsumed(receipt_id),
            })
        );
    }

    #[test]
    fn test_same_receipt_twice_in_one_body_refused() {
        let mut h = Harness::new();
        let receipt_id = h.receipt(0, CAROL, 50);
        let err = h
            .node
            .build_collation(
                0,
                GENESIS_HASH,
                vec![consume(0, receipt_id), consume(0, receipt_id)],
                [0xC0; 20],
                &h.collator,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ManagerError::Execution(ExecutionError::Receipt { index: 1, .. })
        ));
    }

    #[test]
    fn test_wrong_shard_refused() {
        let mut h = Harness::new();
        let receipt_id = h.receipt(3, CAROL, 50);

        // Transaction names shard 3 but runs on shard 0
        let err = h
            .node
            .build_collation(0, GENESIS_HASH, vec![consume(3, receipt_id)], [0xC0; 20], &h.collator)
            .unwrap_err();
        assert!(matches!(
            err,
            ManagerError::Execution(ExecutionError::WrongShard { expected: 0, got: 3, .. })
        ));

        // Transaction names shard 0 for a receipt addressed to shard 3
        let err = h
            .node
            .build_collation(0, GENESIS_HASH, vec![consume(0, receipt_id)], [0xC0; 20], &h.collator)
            .unwrap_err();
        assert!(matches!(
            err,
            ManagerError::Execution(ExecutionError::Receipt {
                source: ReceiptError::WrongShard { .. },
                ..
            })
        ));
        assert!(!h.node.manager().get_receipt(receipt_id).unwrap().consumed);
    }

    #[test]
    fn test_unknown_receipt_refused() {
        let h = Harness::new();
        let err = h
            .node
            .build_collation(0, GENESIS_HASH, vec![consume(0, 99)], [0xC0; 20], &h.collator)
            .unwrap_err();
        assert!(matches!(
            err,
            ManagerError::Execution(ExecutionError::UnknownReceipt { receipt_id: 99, .. })
        ));
    }

    #[test]
    fn test_sibling_forks_consume_independently() {
        let mut h = Harness::new();
        let receipt_id = h.receipt(2, CAROL, 300);

        let a1 = h.build(2, GENESIS_HASH, vec![consume(2, receipt_id)]);
        let a1_hash = a1.hash();
        assert_eq!(h.submit(a1).settled, vec![receipt_id]);

        // A sibling on genesis never saw A1's used set
        h.next_period();
        let b1 = h.build(2, GENESIS_HASH, vec![consume(2, receipt_id)]);
        let b1_hash = b1.hash();
        let submission = h.submit(b1);
        assert!(submission.report.outcome.is_accepted());
        assert!(submission.settled.is_empty());

        assert_eq!(h.balance_at(2, &a1_hash, &CAROL), 300);
        assert_eq!(h.balance_at(2, &b1_hash, &CAROL), 300);
        assert_eq!(h.events.events_named("add_used_receipt").len(), 1);
    }

    #[test]
    fn test_receipt_to_missing_shard() {
        let mut h = Harness::new();
        let err = h
            .node
            .manager_mut()
            .tx_to_shard(sc_02_cross_shard_receipts::ReceiptRequest {
                sender: [1u8; 20],
                shard_id: 4,
                to: CAROL,
                startgas: 0,
                gasprice: 0,
                data: vec![],
                value: 1,
            })
            .unwrap_err();
        assert_eq!(err, ManagerError::Receipt(ReceiptError::InvalidShard(4)));
        assert!(h.node.manager().receipts().read().is_empty());
    }
}
