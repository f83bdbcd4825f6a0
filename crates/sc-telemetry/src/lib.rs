//! # Shard-Chain Telemetry
//!
//! Structured logging for every Shard-Chain subsystem.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sc_telemetry::{init_logging, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_logging(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SC_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `SC_JSON_LOGS` | `false` | Emit JSON lines instead of pretty output |
//! | `SC_SERVICE_NAME` | `shard-chain` | Service name recorded at startup |

#![warn(missing_docs)]

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The log filter directive could not be parsed
    #[error("Invalid log filter '{directive}': {reason}")]
    InvalidFilter {
        /// Directive as supplied
        directive: String,
        /// Parser message
        reason: String,
    },

    /// A global subscriber is already installed
    #[error("Failed to install subscriber: {0}")]
    SubscriberInit(String),
}
