//! # Collator Sampler
//!
//! Bounded rejection sampling over the validator slot space.
//!
//! ## Algorithm
//!
//! 1. `index_in_subset = keccak(period_seed ‖ word(shard_id)) mod subset_size`
//! 2. For `round` in `0..rounds`:
//!    `candidate = keccak(cycle_seed ‖ word(shard_id) ‖ word(index_in_subset) ‖ word(round)) mod max_slot_index`;
//!    the first occupied candidate wins.
//! 3. Otherwise return the zero address.
//!
//! Words are 32-byte big-endian and the reduction uses the full 256-bit
//! hash, so every node computes the same collator.

use crate::ports::SlotView;
use super::seeds::SeedMaterial;
use shared_crypto::{keccak256_many, mod_u64, word_from_u64};
use shared_types::{Address, Hash, ProtocolConfig, ShardId, SlotIndex, ZERO_ADDRESS};
use tracing::debug;

/// Sampler bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplerParams {
    /// Rejection rounds before giving up.
    pub rounds: u32,
    /// Modulus of the per-period subset index.
    pub subset_size: u64,
}

impl Default for SamplerParams {
    fn default() -> Self {
        Self {
            rounds: 1024,
            subset_size: 100,
        }
    }
}

impl SamplerParams {
    /// Take the bounds from the protocol configuration.
    pub fn from_config(config: &ProtocolConfig) -> Self {
        Self {
            rounds: config.sample_rounds,
            subset_size: config.subset_size,
        }
    }
}

/// Result of one sampling call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleOutcome {
    /// An occupied slot was hit.
    Selected {
        /// Validation code of the collator.
        validation_code_addr: Address,
        /// Slot that was hit.
        slot: SlotIndex,
        /// Round it was hit in.
        round: u32,
    },
    /// The registry is empty.
    NoValidators,
    /// Every round landed on a free slot.
    Exhausted {
        /// Rounds tried.
        rounds: u32,
    },
}

impl SampleOutcome {
    /// Collator address, or [`ZERO_ADDRESS`] when nobody was selected.
    pub fn address(&self) -> Address {
        match self {
            SampleOutcome::Selected {
                validation_code_addr,
                ..
            } => *validation_code_addr,
            _ => ZERO_ADDRESS,
        }
    }

    /// Whether a collator was selected.
    pub fn is_selected(&self) -> bool {
        matches!(self, SampleOutcome::Selected { .. })
    }
}

/// Per-period subset index of `shard_id`.
pub fn index_in_subset(period_seed: &Hash, shard_id: ShardId, subset_size: u64) -> u64 {
    let hash = keccak256_many(&[period_seed, &word_from_u64(u64::from(shard_id))]);
    mod_u64(&hash, subset_size).unwrap_or(0)
}

/// Slot probed in `round`; `None` when the slot space is empty.
pub fn candidate_slot(
    cycle_seed: &Hash,
    shard_id: ShardId,
    index_in_subset: u64,
    round: u32,
    max_slot_index: u64,
) -> Option<SlotIndex> {
    let hash = keccak256_many(&[
        cycle_seed,
        &word_from_u64(u64::from(shard_id)),
        &word_from_u64(index_in_subset),
        &word_from_u64(u64::from(round)),
    ]);
    mod_u64(&hash, max_slot_index)
}

/// Pick the collator of `shard_id` for the period the seeds describe.
pub fn sample<V: SlotView + ?Sized>(
    shard_id: ShardId,
    seeds: &SeedMaterial,
    view: &V,
    params: &SamplerParams,
) -> SampleOutcome {
    let subset_index = index_in_subset(&seeds.period_seed, shard_id, params.subset_size);

    if view.occupied_count() == 0 {
        debug!("[sc-01] Sampling shard {}: no validators", shard_id);
        return SampleOutcome::NoValidators;
    }

    let max_index = view.max_slot_index();
    for round in 0..params.rounds {
        let Some(slot) =
            candidate_slot(&seeds.cycle_seed, shard_id, subset_index, round, max_index)
        else {
            break;
        };
        if let Some(validation_code_addr) = view.validation_code_at(slot) {
            debug!(
                "[sc-01] Sampled slot {} for shard {} in round {}",
                slot, shard_id, round
            );
            return SampleOutcome::Selected {
                validation_code_addr,
                slot,
                round,
            };
        }
    }

    debug!(
        "[sc-01] Sampling shard {} exhausted {} rounds",
        shard_id, params.rounds
    );
    SampleOutcome::Exhausted {
        rounds: params.rounds,
    }
}
