//! # Protocol Configuration
//!
//! Fixed protocol constants shared by the validator manager, the sampler and
//! every shard chain. Defaults mirror the deployed manager contract.

use crate::entities::{BlockNumber, PeriodNumber, ShardId, Wei};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Protocol-wide constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Exact stake a validator must deposit (10^20 wei = 100 ETH).
    pub deposit_size: Wei,
    /// Main-chain blocks between sampler reseeds.
    pub shuffling_cycle_length: u64,
    /// Main-chain blocks per period.
    pub period_length: u64,
    /// Number of shards.
    pub shard_count: ShardId,
    /// Gas available to a single validation-code check.
    pub sig_gas_limit: u64,
    /// Rejection-sampling rounds before the sampler gives up.
    pub sample_rounds: u32,
    /// Modulus of the per-period subset index.
    pub subset_size: u64,
    /// Gas limit for the transactions of one collation.
    pub collation_gas_limit: u64,
    /// Maximum transactions in one collation.
    pub max_txs_per_collation: usize,
    /// Maximum queued orphans per shard before the oldest is evicted.
    pub max_orphans_per_shard: usize,
    /// Periods an orphan may wait for its parent before pruning.
    pub orphan_retention_periods: u64,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            deposit_size: 100_000_000_000_000_000_000,
            shuffling_cycle_length: 2500,
            period_length: 5,
            shard_count: 100,
            sig_gas_limit: 400_000,
            sample_rounds: 1024,
            subset_size: 100,
            collation_gas_limit: 10_000_000,
            max_txs_per_collation: 4096,
            max_orphans_per_shard: 1024,
            orphan_retention_periods: 64,
        }
    }
}

impl ProtocolConfig {
    /// Create config for testing.
    pub fn for_testing() -> Self {
        Self {
            shuffling_cycle_length: 25,
            period_length: 5,
            shard_count: 4,
            max_orphans_per_shard: 16,
            orphan_retention_periods: 4,
            ..Self::default()
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SC_DEPOSIT_SIZE`: Stake in wei (default: 10^20)
    /// - `SC_SHUFFLING_CYCLE_LENGTH`: Blocks per shuffling cycle (default: 2500)
    /// - `SC_PERIOD_LENGTH`: Blocks per period (default: 5)
    /// - `SC_SHARD_COUNT`: Number of shards (default: 100)
    /// - `SC_SIG_GAS_LIMIT`: Validation-code gas (default: 400000)
    /// - `SC_COLLATION_GAS_LIMIT`: Collation gas limit (default: 10000000)
    /// - `SC_MAX_ORPHANS_PER_SHARD`: Orphan queue bound (default: 1024)
    ///
    /// Unparsable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            deposit_size: env_or("SC_DEPOSIT_SIZE", defaults.deposit_size),
            shuffling_cycle_length: env_or(
                "SC_SHUFFLING_CYCLE_LENGTH",
                defaults.shuffling_cycle_length,
            ),
            period_length: env_or("SC_PERIOD_LENGTH", defaults.period_length),
            shard_count: env_or("SC_SHARD_COUNT", defaults.shard_count),
            sig_gas_limit: env_or("SC_SIG_GAS_LIMIT", defaults.sig_gas_limit),
            collation_gas_limit: env_or("SC_COLLATION_GAS_LIMIT", defaults.collation_gas_limit),
            max_orphans_per_shard: env_or(
                "SC_MAX_ORPHANS_PER_SHARD",
                defaults.max_orphans_per_shard,
            ),
            ..defaults
        }
    }

    /// Reject configurations that would divide by zero or never sample.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.deposit_size == 0 {
            return Err(ConfigError::ZeroDeposit);
        }
        let checks: [(&'static str, u64); 5] = [
            ("shuffling_cycle_length", self.shuffling_cycle_length),
            ("period_length", self.period_length),
            ("shard_count", u64::from(self.shard_count)),
            ("sample_rounds", u64::from(self.sample_rounds)),
            ("subset_size", self.subset_size),
        ];
        for (field, value) in checks {
            if value == 0 {
                return Err(ConfigError::ZeroValue { field });
            }
        }
        Ok(())
    }

    /// Period containing `block_number`.
    pub fn period_of(&self, block_number: BlockNumber) -> PeriodNumber {
        block_number / self.period_length
    }

    /// Period a collation built on top of `block_number` must target.
    pub fn expected_period_number(&self, block_number: BlockNumber) -> PeriodNumber {
        (block_number + 1) / self.period_length
    }

    /// Number of the main-chain block whose hash anchors `period`.
    pub fn period_start_prevblock(&self, period: PeriodNumber) -> BlockNumber {
        (period * self.period_length).saturating_sub(1)
    }

    /// Whether `shard_id` names an existing shard.
    pub fn is_valid_shard(&self, shard_id: ShardId) -> bool {
        shard_id < self.shard_count
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring unparsable configuration value");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_contract_constants() {
        let config = ProtocolConfig::default();
        assert_eq!(config.deposit_size, 10u128.pow(20));
        assert_eq!(config.shuffling_cycle_length, 2500);
        assert_eq!(config.period_length, 5);
        assert_eq!(config.shard_count, 100);
        assert_eq!(config.sig_gas_limit, 400_000);
        assert_eq!(config.sample_rounds, 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_for_testing_is_valid() {
        let config = ProtocolConfig::for_testing();
        assert_eq!(config.shard_count, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_period() {
        let config = ProtocolConfig {
            period_length: 0,
            ..ProtocolConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroValue {
                field: "period_length"
            })
        );
    }

    #[test]
    fn test_validate_rejects_zero_deposit() {
        let config = ProtocolConfig {
            deposit_size: 0,
            ..ProtocolConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroDeposit));
    }

    #[test]
    fn test_period_arithmetic() {
        let config = ProtocolConfig::default();
        assert_eq!(config.period_of(9), 1);
        assert_eq!(config.expected_period_number(9), 2);
        assert_eq!(config.expected_period_number(3), 0);
        assert_eq!(config.period_start_prevblock(2), 9);
        assert_eq!(config.period_start_prevblock(0), 0);
    }

    #[test]
    fn test_shard_range() {
        let config = ProtocolConfig::for_testing();
        assert!(config.is_valid_shard(3));
        assert!(!config.is_valid_shard(4));
    }
}
