//! # Error Types
//!
//! Error types shared across subsystems.

use thiserror::Error;

/// Protocol configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A length parameter that is used as a divisor was zero.
    #[error("Invalid configuration: {field} must be non-zero")]
    ZeroValue {
        /// Offending field name
        field: &'static str,
    },

    /// The deposit size cannot be zero.
    #[error("Invalid configuration: deposit_size must be positive")]
    ZeroDeposit,
}
