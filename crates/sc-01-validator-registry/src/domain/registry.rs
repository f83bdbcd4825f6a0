//! # Registry Aggregate
//!
//! The validator table: slot index -> [`ValidatorRecord`].
//!
//! ## Slot Allocation
//!
//! Withdrawn slots are pushed on a LIFO free-list and handed out again by the
//! next deposit before the table grows. The sampling modulus
//! `max_slot_index = occupied_count + free_slots.len()` therefore covers every
//! slot ever allocated, including holes.
//!
//! ## Revert Semantics
//!
//! Every check runs before the first mutation, so a failed `deposit` or
//! `withdraw` leaves the table untouched.

use super::entities::{withdraw_message, ValidatorRecord, Withdrawal};
use super::errors::{RegistryError, RegistryResult};
use crate::ports::{SlotView, ValidationCode};
use shared_types::{short_hex, Address, SlotIndex, Wei};
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Validator table with slot reuse.
#[derive(Clone, Debug)]
pub struct Registry {
    deposit_size: Wei,
    slots: Vec<Option<ValidatorRecord>>,
    free_slots: Vec<SlotIndex>,
    occupied_count: u64,
    deposited_codes: BTreeSet<Address>,
}

impl Registry {
    /// Create an empty registry requiring `deposit_size` per validator.
    pub fn new(deposit_size: Wei) -> Self {
        Self {
            deposit_size,
            slots: Vec::new(),
            free_slots: Vec::new(),
            occupied_count: 0,
            deposited_codes: BTreeSet::new(),
        }
    }

    /// Stake required per validator.
    pub fn deposit_size(&self) -> Wei {
        self.deposit_size
    }

    /// Register a validator and return its slot.
    pub fn deposit(
        &mut self,
        validation_code_addr: Address,
        return_addr: Address,
        value: Wei,
    ) -> RegistryResult<SlotIndex> {
        if self.deposited_codes.contains(&validation_code_addr) {
            warn!(
                "[sc-01] Deposit reverted: code {} already deposited",
                short_hex(&validation_code_addr)
            );
            return Err(RegistryError::DuplicateValidationCode(validation_code_addr));
        }
        if value != self.deposit_size {
            warn!(
                "[sc-01] Deposit reverted: value {} != deposit size {}",
                value, self.deposit_size
            );
            return Err(RegistryError::WrongDepositValue {
                expected: self.deposit_size,
                got: value,
            });
        }

        let record = ValidatorRecord {
            deposit: value,
            validation_code_addr,
            return_addr,
        };

        let slot = match self.free_slots.pop() {
            Some(slot) => {
                self.slots[slot as usize] = Some(record);
                slot
            }
            None => {
                // Without holes the table is exactly `occupied_count` long
                let slot = self.occupied_count;
                self.slots.push(Some(record));
                slot
            }
        };

        self.occupied_count += 1;
        self.deposited_codes.insert(validation_code_addr);

        info!(
            "[sc-01] Deposited validator {} into slot {} ({} active)",
            short_hex(&validation_code_addr),
            slot,
            self.occupied_count
        );
        Ok(slot)
    }

    /// Withdraw the validator in `slot` if `signature` signs the withdraw
    /// message under the slot's validation code.
    pub fn try_withdraw(
        &mut self,
        slot: SlotIndex,
        signature: &[u8],
        codes: &dyn ValidationCode,
        sig_gas_limit: u64,
    ) -> RegistryResult<Withdrawal> {
        let record = self.get(slot).ok_or(RegistryError::UnknownSlot(slot))?;

        codes.verify(
            &record.validation_code_addr,
            &withdraw_message(),
            signature,
            sig_gas_limit,
        )?;

        let record = self.slots[slot as usize]
            .take()
            .ok_or(RegistryError::UnknownSlot(slot))?;
        self.deposited_codes.remove(&record.validation_code_addr);
        self.free_slots.push(slot);
        self.occupied_count -= 1;

        info!(
            "[sc-01] Withdrew validator {} from slot {}, refunding {} to {}",
            short_hex(&record.validation_code_addr),
            slot,
            record.deposit,
            short_hex(&record.return_addr)
        );

        Ok(Withdrawal {
            slot,
            validation_code_addr: record.validation_code_addr,
            return_addr: record.return_addr,
            amount: record.deposit,
        })
    }

    /// Boolean form of [`Registry::try_withdraw`].
    pub fn withdraw(
        &mut self,
        slot: SlotIndex,
        signature: &[u8],
        codes: &dyn ValidationCode,
        sig_gas_limit: u64,
    ) -> bool {
        match self.try_withdraw(slot, signature, codes, sig_gas_limit) {
            Ok(_) => true,
            Err(e) => {
                warn!("[sc-01] Withdraw of slot {} reverted: {}", slot, e);
                false
            }
        }
    }

    /// Record in `slot`, if occupied.
    pub fn get(&self, slot: SlotIndex) -> Option<&ValidatorRecord> {
        self.slots.get(slot as usize).and_then(Option::as_ref)
    }

    /// Whether `validation_code_addr` backs a deposited validator.
    pub fn is_code_deposited(&self, validation_code_addr: &Address) -> bool {
        self.deposited_codes.contains(validation_code_addr)
    }

    /// Free-list contents, bottom of the stack first.
    pub fn free_slots(&self) -> &[SlotIndex] {
        &self.free_slots
    }

    /// Number of occupied slots.
    pub fn occupied_count(&self) -> u64 {
        self.occupied_count
    }

    /// `occupied_count + free_list_size`.
    pub fn max_slot_index(&self) -> u64 {
        self.occupied_count + self.free_slots.len() as u64
    }
}

impl SlotView for Registry {
    fn occupied_count(&self) -> u64 {
        self.occupied_count
    }

    fn max_slot_index(&self) -> u64 {
        Registry::max_slot_index(self)
    }

    fn validation_code_at(&self, slot: SlotIndex) -> Option<Address> {
        self.get(slot).map(|r| r.validation_code_addr)
    }
}
