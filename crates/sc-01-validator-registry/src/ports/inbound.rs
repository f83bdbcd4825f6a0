//! # Inbound Ports
//!
//! Read-only view of the validator table.

use shared_types::{Address, SlotIndex};

/// Snapshot of the slot space the sampler draws from.
///
/// Implemented by [`crate::Registry`]; tests implement it directly to build
/// sparse tables without running deposits.
pub trait SlotView {
    /// Number of occupied slots.
    fn occupied_count(&self) -> u64;

    /// Upper bound of the slot space (occupied + free).
    fn max_slot_index(&self) -> u64;

    /// Validation code of an occupied slot, `None` for free or out-of-range slots.
    fn validation_code_at(&self, slot: SlotIndex) -> Option<Address>;
}
