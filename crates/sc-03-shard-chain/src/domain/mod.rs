//! # Domain Module
//!
//! Collations, transactions, per-collation status and error types.

pub mod codec;
pub mod collation;
pub mod errors;
pub mod status;
pub mod transaction;

pub use collation::{tx_list_root, Collation, CollationHeader};
pub use errors::*;
pub use status::*;
pub use transaction::{Transaction, UnsignedTransaction};
