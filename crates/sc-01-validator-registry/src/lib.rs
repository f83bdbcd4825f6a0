//! # SC-01 Validator Registry
//!
//! Stake deposits, withdrawals and deterministic collator sampling.
//!
//! **Subsystem ID:** 01
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Keep the validator table: one slot per staked validator, freed slots
//!   recycled through a LIFO free-list
//! - Authorize withdrawals through the validator's validation code
//! - Pick the collator of a shard for a period by bounded rejection sampling
//!   over the slot space
//!
//! ## Module Structure
//!
//! ```text
//! sc-01-validator-registry/
//! ├── domain/          # Registry aggregate, ValidatorRecord, RegistryError
//! ├── algorithms/      # Sampler and seed derivation
//! ├── ports/           # ValidationCode (outbound), SlotView (read-only registry view)
//! └── adapters/        # secp256k1 validation codes
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::EcrecoverValidationCode;
pub use algorithms::{
    candidate_slot, derive_seeds, index_in_subset, sample, SampleOutcome, SamplerParams,
    SeedMaterial,
};
pub use domain::{
    withdraw_message, Registry, RegistryError, RegistryResult, ValidatorRecord, Withdrawal,
};
pub use ports::{SlotView, ValidationCode, ECRECOVER_GAS};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
