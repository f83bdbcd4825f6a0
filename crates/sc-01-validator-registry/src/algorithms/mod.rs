//! # Algorithms Module
//!
//! Collator sampling and the seed material it consumes.

pub mod sampler;
pub mod seeds;

pub use sampler::{candidate_slot, index_in_subset, sample, SampleOutcome, SamplerParams};
pub use seeds::{derive_seeds, SeedMaterial};
