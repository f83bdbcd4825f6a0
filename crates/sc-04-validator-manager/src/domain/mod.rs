//! # Domain Module
//!
//! Main-chain header records, manager events and errors.

pub mod entities;
pub mod errors;
pub mod header_table;

pub use entities::{AddedHeader, HeaderRecord, ManagerEvent, Submission};
pub use errors::{ManagerError, ManagerResult};
pub use header_table::HeaderTable;
