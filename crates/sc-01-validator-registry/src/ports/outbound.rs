//! # Outbound Ports
//!
//! Validation codes authorize a validator's signatures. They stand in for a
//! public-key check and are executed under a gas limit.

use crate::domain::RegistryResult;
use shared_types::{Address, Hash};

/// Gas charged by the secp256k1 recovery precompile.
pub const ECRECOVER_GAS: u64 = 3000;

/// Validation-code executor - outbound port.
pub trait ValidationCode: Send + Sync {
    /// Run the code deployed at `code_addr` on `(msg_hash, signature)`.
    ///
    /// Returns `Ok(())` only when the code accepts the signature within
    /// `gas_limit`.
    fn verify(
        &self,
        code_addr: &Address,
        msg_hash: &Hash,
        signature: &[u8],
        gas_limit: u64,
    ) -> RegistryResult<()>;
}
