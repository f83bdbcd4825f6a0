//! # Ports Layer
//!
//! - `inbound`: read-only registry view consumed by the sampler
//! - `outbound`: validation-code execution

pub mod inbound;
pub mod outbound;

pub use inbound::SlotView;
pub use outbound::{ValidationCode, ECRECOVER_GAS};
