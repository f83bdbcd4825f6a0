//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits for the validator registry.

mod validation_code;

pub use validation_code::EcrecoverValidationCode;
