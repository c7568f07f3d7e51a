//! Fixed ledger parameters
//!
//! | Tier   | Code | Minimum stake |
//! |--------|------|---------------|
//! | Bronze | 1    | 1,000         |
//! | Silver | 2    | 5,000         |
//! | Gold   | 3    | 10,000        |
//!
//! Every tier shares one lockup period of 1,440 blocks.

use crate::account::AccountId;
use crate::error::ChainError;
use crate::ledger::Tier;

/// Token amounts. Balances can never go negative, so the type is unsigned.
pub type Amount = u128;

/// Chain height supplied by the caller.
pub type BlockHeight = u64;

pub const MAX_SUPPLY: Amount = 1_000_000_000;
pub const BRONZE_MINIMUM: Amount = 1_000;
pub const SILVER_MINIMUM: Amount = 5_000;
pub const GOLD_MINIMUM: Amount = 10_000;
pub const LOCKUP_PERIOD: BlockHeight = 1_440;

/// Constants a ledger instance is built with. They never change after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LedgerParams {
    pub max_supply: Amount,
    pub lockup_period: BlockHeight,
    pub bronze_minimum: Amount,
    pub silver_minimum: Amount,
    pub gold_minimum: Amount,
    pub burn_address: AccountId,
}

impl Default for LedgerParams {
    fn default() -> Self {
        Self {
            max_supply: MAX_SUPPLY,
            lockup_period: LOCKUP_PERIOD,
            bronze_minimum: BRONZE_MINIMUM,
            silver_minimum: SILVER_MINIMUM,
            gold_minimum: GOLD_MINIMUM,
            burn_address: AccountId::burn(),
        }
    }
}

impl LedgerParams {
    pub fn tier_minimum(&self, tier: Tier) -> Amount {
        match tier {
            Tier::Bronze => self.bronze_minimum,
            Tier::Silver => self.silver_minimum,
            Tier::Gold => self.gold_minimum,
        }
    }

    pub fn is_burn_address(&self, account: &AccountId) -> bool {
        *account == self.burn_address
    }

    /// Rejects parameter sets under which the staking rules stop making
    /// sense. A zero minimum would let zero-amount stakes open locks.
    pub fn validate(&self) -> Result<(), ChainError> {
        if self.max_supply == 0 {
            return Err(ChainError::ConfigError("max_supply must be positive".to_string()));
        }
        for tier in Tier::ALL {
            if self.tier_minimum(tier) == 0 {
                return Err(ChainError::ConfigError(format!("{} minimum must be positive", tier)));
            }
        }
        if self.burn_address.as_str().is_empty() {
            return Err(ChainError::ConfigError("burn_address must be set".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let params = LedgerParams::default();
        assert_eq!(params.tier_minimum(Tier::Bronze), 1_000);
        assert_eq!(params.tier_minimum(Tier::Silver), 5_000);
        assert_eq!(params.tier_minimum(Tier::Gold), 10_000);
        assert_eq!(params.lockup_period, 1_440);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_zero_minimum_rejected() {
        let params = LedgerParams { silver_minimum: 0, ..LedgerParams::default() };
        assert!(params.validate().is_err());
    }
}
