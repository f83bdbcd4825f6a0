//! # Validator Manager
//!
//! The main-chain side of the protocol.
//!
//! ## Operations
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | `deposit` | Stake exactly `deposit_size`, get a slot |
//! | `withdraw` | Free the slot, refund the stake to `return_addr` |
//! | `sample` | Collator of a shard for the current period |
//! | `add_header` | Record a collation header signed by the sampled collator |
//! | `tx_to_shard` | Escrow a cross-shard call, return its receipt id |
//!
//! Every operation validates before mutating: a failed call leaves the
//! registry, header table and receipt ledger unchanged and emits nothing.

use crate::domain::{AddedHeader, HeaderRecord, HeaderTable, ManagerError, ManagerEvent, ManagerResult};
use crate::ports::{EventBus, MainChainView};
use sc_01_validator_registry::{
    derive_seeds, sample, Registry, SampleOutcome, SamplerParams, SeedMaterial, ValidationCode,
    Withdrawal,
};
use sc_02_cross_shard_receipts::{Receipt, ReceiptRequest, SharedReceiptLedger};
use sc_03_shard_chain::CollationHeader;
use shared_types::{
    short_hex, Address, Hash, PeriodNumber, ProtocolConfig, ReceiptId, ShardId, SlotIndex, Wei,
    GENESIS_HASH,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Main-chain validator manager.
pub struct ValidatorManager<M: MainChainView> {
    config: ProtocolConfig,
    main_chain: M,
    registry: Registry,
    validation_code: Arc<dyn ValidationCode>,
    receipts: SharedReceiptLedger,
    headers: HeaderTable,
    refunds: BTreeMap<Address, Wei>,
    events: Arc<dyn EventBus>,
}

impl<M: MainChainView> ValidatorManager<M> {
    /// Create a manager over `main_chain`.
    pub fn new(
        config: ProtocolConfig,
        main_chain: M,
        validation_code: Arc<dyn ValidationCode>,
        events: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            registry: Registry::new(config.deposit_size),
            receipts: SharedReceiptLedger::new(config.shard_count),
            headers: HeaderTable::new(),
            refunds: BTreeMap::new(),
            config,
            main_chain,
            validation_code,
            events,
        }
    }

    /// Stake `value` for `validation_code_addr`; returns the slot.
    pub fn deposit(
        &mut self,
        validation_code_addr: Address,
        return_addr: Address,
        value: Wei,
    ) -> ManagerResult<SlotIndex> {
        let slot = self
            .registry
            .deposit(validation_code_addr, return_addr, value)?;
        self.events.publish(ManagerEvent::Deposit {
            slot,
            validation_code_addr,
            return_addr,
        });
        Ok(slot)
    }

    /// Withdraw the validator in `slot`; the stake is credited to its
    /// return address.
    pub fn try_withdraw(&mut self, slot: SlotIndex, signature: &[u8]) -> ManagerResult<Withdrawal> {
        let withdrawal = self.registry.try_withdraw(
            slot,
            signature,
            self.validation_code.as_ref(),
            self.config.sig_gas_limit,
        )?;

        let refund = self.refunds.entry(withdrawal.return_addr).or_insert(0);
        *refund = refund.saturating_add(withdrawal.amount);
        self.events.publish(ManagerEvent::Withdraw { slot });
        Ok(withdrawal)
    }

    /// Boolean form of [`ValidatorManager::try_withdraw`].
    pub fn withdraw(&mut self, slot: SlotIndex, signature: &[u8]) -> bool {
        match self.try_withdraw(slot, signature) {
            Ok(_) => true,
            Err(e) => {
                warn!("[sc-04] Withdraw of slot {} reverted: {}", slot, e);
                false
            }
        }
    }

    /// Seeds in force at the current main-chain block.
    pub fn current_seeds(&self) -> SeedMaterial {
        let chain = &self.main_chain;
        derive_seeds(chain.block_number(), &self.config, |n| {
            chain.block_hash(n).unwrap_or(GENESIS_HASH)
        })
    }

    /// Full sampling result for `shard_id` in the current period.
    pub fn sample_outcome(&self, shard_id: ShardId) -> ManagerResult<SampleOutcome> {
        self.check_shard(shard_id)?;
        Ok(sample(
            shard_id,
            &self.current_seeds(),
            &self.registry,
            &SamplerParams::from_config(&self.config),
        ))
    }

    /// Validation code of the collator of `shard_id` for the current
    /// period (`ZERO_ADDRESS` if none).
    pub fn sample(&self, shard_id: ShardId) -> ManagerResult<Address> {
        Ok(self.sample_outcome(shard_id)?.address())
    }

    /// Record a collation header.
    ///
    /// Checks, in order: decoding, shard range, current period,
    /// `period_start_prevhash`, parent linkage and number, one header per
    /// period, and the signature against the sampled collator's
    /// validation code.
    pub fn add_header(&mut self, header_bytes: &[u8]) -> ManagerResult<AddedHeader> {
        let header = CollationHeader::decode_bytes(header_bytes)?;
        let shard_id = header.shard_id;
        self.check_shard(shard_id)?;

        let period = self.current_period();
        if header.expected_period_number != period {
            return Err(ManagerError::WrongPeriod {
                expected: period,
                got: header.expected_period_number,
            });
        }

        let prevhash = self.get_period_start_prevhash(period)?;
        if header.period_start_prevhash != prevhash {
            return Err(ManagerError::WrongPeriodStartPrevhash { period });
        }

        let score = self.headers.check(
            shard_id,
            &header.parent_collation_hash,
            header.number,
            period,
        )?;

        let collator = match self.sample_outcome(shard_id)? {
            SampleOutcome::Selected {
                validation_code_addr,
                ..
            } => validation_code_addr,
            _ => return Err(ManagerError::NoCollator(shard_id)),
        };
        self.validation_code.verify(
            &collator,
            &header.signing_hash(),
            &header.signature,
            self.config.sig_gas_limit,
        )?;

        let record = HeaderRecord {
            shard_id,
            hash: header.hash(),
            parent_hash: header.parent_collation_hash,
            number: header.number,
            period,
            score,
        };
        let head_change = self.headers.insert(record.clone());

        info!(
            "[sc-04] add_header: shard {} #{} {} (period {}, score {})",
            shard_id,
            record.number,
            short_hex(&record.hash),
            period,
            score
        );
        self.events.publish(ManagerEvent::AddHeader {
            shard_id,
            hash: record.hash,
            header: header_bytes.to_vec(),
        });
        if let Some((new_head, previous_head)) = head_change {
            self.events.publish(ManagerEvent::ChangeHead {
                shard_id,
                new_head,
                previous_head,
            });
        }

        Ok(AddedHeader {
            record,
            head_change,
        })
    }

    /// Escrow a cross-shard call; returns its receipt id.
    pub fn tx_to_shard(&mut self, request: ReceiptRequest) -> ManagerResult<ReceiptId> {
        let to = request.to;
        let shard_id = request.shard_id;
        let receipt_id = self.receipts.write().create_receipt(request)?;
        self.events.publish(ManagerEvent::TxToShard {
            receipt_id,
            shard_id,
            to,
        });
        Ok(receipt_id)
    }

    /// Flip the sending-side flag of a receipt a shard has consumed.
    ///
    /// Returns `false` if it was already flipped (a sibling fork of the
    /// shard consumed it first).
    pub fn settle_used_receipt(
        &mut self,
        shard_id: ShardId,
        receipt_id: ReceiptId,
    ) -> ManagerResult<bool> {
        let newly = self.receipts.write().mark_consumed(receipt_id)?;
        if newly {
            self.events.publish(ManagerEvent::AddUsedReceipt {
                shard_id,
                receipt_id,
            });
        }
        Ok(newly)
    }

    /// Value escrowed by a receipt.
    pub fn get_receipts_value(&self, receipt_id: ReceiptId) -> Option<Wei> {
        self.receipts.read().receipt_value(receipt_id)
    }

    /// Full receipt record.
    pub fn get_receipt(&self, receipt_id: ReceiptId) -> Option<Receipt> {
        self.receipts.read().get(receipt_id).cloned()
    }

    /// Score of a recorded header.
    pub fn get_collation_headers_score(&self, shard_id: ShardId, hash: &Hash) -> Option<u64> {
        self.headers.score(shard_id, hash)
    }

    /// Main chain's head for `shard_id` (`GENESIS_HASH` if none).
    pub fn get_head(&self, shard_id: ShardId) -> Hash {
        self.headers.head(shard_id)
    }

    /// Hash of the block preceding `period`.
    pub fn get_period_start_prevhash(&self, period: PeriodNumber) -> ManagerResult<Hash> {
        let number = self.config.period_start_prevblock(period);
        self.main_chain
            .block_hash(number)
            .ok_or(ManagerError::UnknownBlock(number))
    }

    /// Collation gas limit.
    pub fn get_collation_gas_limit(&self) -> u64 {
        self.config.collation_gas_limit
    }

    /// Period of the current main-chain block.
    pub fn current_period(&self) -> PeriodNumber {
        self.config
            .expected_period_number(self.main_chain.block_number())
    }

    /// Refunds credited to `address` by withdrawals.
    pub fn refund_of(&self, address: &Address) -> Wei {
        self.refunds.get(address).copied().unwrap_or(0)
    }

    /// Recorded headers.
    pub fn headers(&self) -> &HeaderTable {
        &self.headers
    }

    /// Validator registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Shared handle to the receipt ledger.
    pub fn receipts(&self) -> SharedReceiptLedger {
        self.receipts.clone()
    }

    /// Main chain.
    pub fn main_chain(&self) -> &M {
        &self.main_chain
    }

    /// Main chain, mutably (for mining).
    pub fn main_chain_mut(&mut self) -> &mut M {
        &mut self.main_chain
    }

    /// Protocol configuration.
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Event sink.
    pub fn events(&self) -> Arc<dyn EventBus> {
        self.events.clone()
    }

    fn check_shard(&self, shard_id: ShardId) -> ManagerResult<()> {
        if self.config.is_valid_shard(shard_id) {
            Ok(())
        } else {
            Err(ManagerError::InvalidShard(shard_id))
        }
    }
}
