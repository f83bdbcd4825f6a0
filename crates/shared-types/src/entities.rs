//! # Core Identifiers
//!
//! Fixed-width identifiers shared by the main chain and every shard chain.
//!
//! ## Clusters
//!
//! - **Hashing**: `Hash`, `GENESIS_HASH`
//! - **Accounts**: `Address`, `ZERO_ADDRESS`, `Wei`
//! - **Sharding**: `ShardId`, `SlotIndex`, `ReceiptId`, `PeriodNumber`

// Re-export U256 from primitive-types for 256-bit modular arithmetic
pub use primitive_types::U256;

// =============================================================================
// CLUSTER A: HASHING
// =============================================================================

/// A 32-byte Keccak-256 hash.
pub type Hash = [u8; 32];

/// Parent hash of the first collation of every shard.
///
/// The genesis collation is never stored as a real collation; it is the
/// all-zero hash with a pre-seeded score of 0.
pub const GENESIS_HASH: Hash = [0u8; 32];

// =============================================================================
// CLUSTER B: ACCOUNTS
// =============================================================================

/// A 20-byte Ethereum-style address.
pub type Address = [u8; 20];

/// Sentinel returned by the sampler when no collator is eligible.
pub const ZERO_ADDRESS: Address = [0u8; 20];

/// Native currency amount in wei.
pub type Wei = u128;

// =============================================================================
// CLUSTER C: SHARDING
// =============================================================================

/// Shard identifier.
pub type ShardId = u32;

/// Index into the validator table.
pub type SlotIndex = u64;

/// Monotonically increasing cross-shard receipt identifier.
pub type ReceiptId = u64;

/// Main-chain period number (`block_number / period_length`).
pub type PeriodNumber = u64;

/// Main-chain block number.
pub type BlockNumber = u64;

/// Short hex prefix of a hash for log lines.
pub fn short_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .take(4)
        .map(|b| format!("{:02x}", b))
        .collect::<String>()
}
