//! secp256k1 Validation Code Adapter
//!
//! Implements `ValidationCode` by recovering the signer of the message and
//! comparing it with the address the code was deployed for. Each check is
//! charged the recovery precompile's gas.

use crate::domain::{RegistryError, RegistryResult};
use crate::ports::{ValidationCode, ECRECOVER_GAS};
use parking_lot::RwLock;
use shared_crypto::{keccak256_many, recover_address, word_from_u64};
use shared_types::{short_hex, Address, Hash};
use std::collections::BTreeMap;
use tracing::debug;

/// In-memory table of deployed validation codes.
pub struct EcrecoverValidationCode {
    /// Code address -> authorized signer.
    codes: RwLock<BTreeMap<Address, Address>>,
    /// Deployment counter, mixed into code addresses.
    nonce: RwLock<u64>,
    /// Gas charged per check.
    gas_cost: u64,
}

impl EcrecoverValidationCode {
    /// Create an empty table charging [`ECRECOVER_GAS`] per check.
    pub fn new() -> Self {
        Self::with_gas_cost(ECRECOVER_GAS)
    }

    /// Create an empty table with a custom per-check gas cost.
    pub fn with_gas_cost(gas_cost: u64) -> Self {
        Self {
            codes: RwLock::new(BTreeMap::new()),
            nonce: RwLock::new(0),
            gas_cost,
        }
    }

    /// Deploy a code authorizing `signer` and return its address.
    pub fn deploy(&self, signer: Address) -> Address {
        let mut nonce = self.nonce.write();
        let hash = keccak256_many(&[&word_from_u64(*nonce), &signer]);
        *nonce += 1;

        let mut code_addr = [0u8; 20];
        code_addr.copy_from_slice(&hash[12..]);
        self.codes.write().insert(code_addr, signer);

        debug!(
            "[sc-01] Deployed validation code {} for signer {}",
            short_hex(&code_addr),
            short_hex(&signer)
        );
        code_addr
    }

    /// Signer authorized by the code at `code_addr`.
    pub fn signer_of(&self, code_addr: &Address) -> Option<Address> {
        self.codes.read().get(code_addr).copied()
    }
}

impl Default for EcrecoverValidationCode {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationCode for EcrecoverValidationCode {
    fn verify(
        &self,
        code_addr: &Address,
        msg_hash: &Hash,
        signature: &[u8],
        gas_limit: u64,
    ) -> RegistryResult<()> {
        let signer = self
            .signer_of(code_addr)
            .ok_or(RegistryError::UnknownValidationCode(*code_addr))?;

        if self.gas_cost > gas_limit {
            return Err(RegistryError::OutOfGas {
                required: self.gas_cost,
                limit: gas_limit,
            });
        }

        match recover_address(msg_hash, signature) {
            Ok(recovered) if recovered == signer => Ok(()),
            _ => Err(RegistryError::SignatureMismatch),
        }
    }
}
