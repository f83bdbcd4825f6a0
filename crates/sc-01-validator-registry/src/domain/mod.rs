//! # Domain Module
//!
//! Core domain types for the validator registry.

pub mod entities;
pub mod errors;
pub mod registry;

pub use entities::*;
pub use errors::*;
pub use registry::Registry;
