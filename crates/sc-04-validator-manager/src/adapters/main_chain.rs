//! In-memory main chain.
//!
//! Block hashes are deterministic (`keccak256(word(number) || salt)`), so two
//! chains built with the same salt agree block for block and different salts
//! model competing main-chain forks.

use crate::ports::MainChainView;
use shared_crypto::{keccak256_many, word_from_u64};
use shared_types::{BlockNumber, Hash};
use tracing::debug;

/// Main chain of deterministic blocks, starting with block 0.
#[derive(Clone, Debug)]
pub struct InMemoryMainChain {
    salt: Hash,
    hashes: Vec<Hash>,
}

impl InMemoryMainChain {
    /// Chain holding only block 0.
    pub fn new(salt: Hash) -> Self {
        let mut chain = Self {
            salt,
            hashes: Vec::new(),
        };
        chain.mine(1);
        chain
    }

    /// Append `count` blocks; returns the new block number.
    pub fn mine(&mut self, count: u64) -> BlockNumber {
        for _ in 0..count {
            let number = self.hashes.len() as u64;
            self.hashes
                .push(keccak256_many(&[&word_from_u64(number), &self.salt]));
        }
        debug!("[sc-04] Main chain at block {}", self.block_number());
        self.block_number()
    }

    /// Mine until block `number` exists.
    pub fn mine_to(&mut self, number: BlockNumber) -> BlockNumber {
        let missing = (number + 1).saturating_sub(self.hashes.len() as u64);
        self.mine(missing)
    }
}

impl Default for InMemoryMainChain {
    fn default() -> Self {
        Self::new([0u8; 32])
    }
}

impl MainChainView for InMemoryMainChain {
    fn block_number(&self) -> BlockNumber {
        (self.hashes.len() as u64).saturating_sub(1)
    }

    fn block_hash(&self, number: BlockNumber) -> Option<Hash> {
        self.hashes.get(number as usize).copied()
    }
}
