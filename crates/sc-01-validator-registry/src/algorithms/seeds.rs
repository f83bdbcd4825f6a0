//! # Seed Derivation
//!
//! The sampler never reads the main chain itself. Callers derive two seeds
//! from main-chain block hashes at fixed offsets:
//!
//! - `cycle_seed = blockhash(cycle * shuffling_cycle_length)` where
//!   `cycle = block_number / shuffling_cycle_length`
//! - `period_seed = blockhash(block_number - block_number % period_length)`

use serde::{Deserialize, Serialize};
use shared_types::{BlockNumber, Hash, ProtocolConfig};

/// Opaque seed material for one sampling call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedMaterial {
    /// Hash of the first block of the shuffling cycle.
    pub cycle_seed: Hash,
    /// Hash of the first block of the period.
    pub period_seed: Hash,
}

/// Derive the seeds in force at `block_number`.
pub fn derive_seeds<F>(
    block_number: BlockNumber,
    config: &ProtocolConfig,
    block_hash: F,
) -> SeedMaterial
where
    F: Fn(BlockNumber) -> Hash,
{
    let cycle = block_number / config.shuffling_cycle_length;
    let cycle_start = cycle * config.shuffling_cycle_length;
    let period_start = block_number - block_number % config.period_length;

    SeedMaterial {
        cycle_seed: block_hash(cycle_start),
        period_seed: block_hash(period_start),
    }
}
