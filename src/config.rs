//! Configuration management for the loyalty ledger

use crate::account::AccountId;
use crate::error::ChainError;
use crate::params::{self, Amount, BlockHeight, LedgerParams};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Deserialize)]
pub struct Config {
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

#[derive(Debug, Deserialize)]
pub struct LedgerConfig {
    pub admin: String,
    #[serde(default = "default_burn_address")]
    pub burn_address: String,
    #[serde(default = "default_max_supply")]
    pub max_supply: u64,
    #[serde(default = "default_lockup_period")]
    pub lockup_period: BlockHeight,
    #[serde(default)]
    pub tiers: TierConfig,
}

/// TOML integers are 64-bit, so amounts are read as `u64` and widened.
#[derive(Debug, Deserialize)]
pub struct TierConfig {
    #[serde(default = "default_bronze_minimum")]
    pub bronze_minimum: u64,
    #[serde(default = "default_silver_minimum")]
    pub silver_minimum: u64,
    #[serde(default = "default_gold_minimum")]
    pub gold_minimum: u64,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            bronze_minimum: default_bronze_minimum(),
            silver_minimum: default_silver_minimum(),
            gold_minimum: default_gold_minimum(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

#[derive(Debug, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_snapshot_path")]
    pub path: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self { path: default_snapshot_path() }
    }
}

impl Config {
    pub fn admin(&self) -> Result<AccountId, ChainError> {
        AccountId::parse(&self.ledger.admin)
    }

    pub fn ledger_params(&self) -> Result<LedgerParams, ChainError> {
        let params = LedgerParams {
            max_supply: Amount::from(self.ledger.max_supply),
            lockup_period: self.ledger.lockup_period,
            bronze_minimum: Amount::from(self.ledger.tiers.bronze_minimum),
            silver_minimum: Amount::from(self.ledger.tiers.silver_minimum),
            gold_minimum: Amount::from(self.ledger.tiers.gold_minimum),
            burn_address: AccountId::parse(&self.ledger.burn_address)?,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn log_level(&self) -> Result<tracing::Level, ChainError> {
        self.logging
            .level
            .parse()
            .map_err(|_| ChainError::ConfigError(format!("Unknown log level {:?}", self.logging.level)))
    }

    fn validate(&self) -> Result<(), ChainError> {
        let admin = self.admin()?;
        let params = self.ledger_params()?;
        if params.is_burn_address(&admin) {
            return Err(ChainError::ConfigError("ledger.admin must not be the burn address".to_string()));
        }
        if self.snapshot.path.is_empty() {
            return Err(ChainError::ConfigError("snapshot.path must be set in config.toml".to_string()));
        }
        self.log_level()?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ledger: LedgerConfig {
                admin: default_admin(),
                burn_address: default_burn_address(),
                max_supply: default_max_supply(),
                lockup_period: default_lockup_period(),
                tiers: TierConfig::default(),
            },
            logging: LoggingConfig::default(),
            snapshot: SnapshotConfig::default(),
        }
    }
}

pub fn parse_config(config_str: &str) -> Result<Config, ChainError> {
    let config: Config = toml::from_str(config_str)?;
    config.validate()?;
    Ok(config)
}

/// Loads `path`, falling back to defaults when the file is absent or empty.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ChainError> {
    let config_str = match fs::read_to_string(path.as_ref()) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };
    if config_str.trim().is_empty() {
        let config = Config::default();
        config.validate()?;
        return Ok(config);
    }
    parse_config(&config_str)
}

fn default_admin() -> String {
    "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM".to_string()
}

fn default_burn_address() -> String {
    crate::account::BURN_ADDRESS.to_string()
}

fn default_max_supply() -> u64 {
    params::MAX_SUPPLY as u64
}

fn default_lockup_period() -> BlockHeight {
    params::LOCKUP_PERIOD
}

fn default_bronze_minimum() -> u64 {
    params::BRONZE_MINIMUM as u64
}

fn default_silver_minimum() -> u64 {
    params::SILVER_MINIMUM as u64
}

fn default_gold_minimum() -> u64 {
    params::GOLD_MINIMUM as u64
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_snapshot_path() -> String {
    "./data/ledger.json".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse_config("[ledger]\nadmin = \"ST1ADMIN\"\n").unwrap();
        assert_eq!(config.admin().unwrap(), AccountId::from("ST1ADMIN"));
        assert_eq!(config.ledger_params().unwrap(), LedgerParams::default());
        assert_eq!(config.snapshot.path, "./data/ledger.json");
        assert_eq!(config.log_level().unwrap(), tracing::Level::INFO);
    }

    #[test]
    fn test_overrides_are_applied() {
        let toml = r#"
            [ledger]
            admin = "ST1ADMIN"
            max_supply = 5000
            lockup_period = 10

            [ledger.tiers]
            gold_minimum = 2500

            [logging]
            level = "debug"
        "#;
        let parsed = parse_config(toml).unwrap().ledger_params().unwrap();
        assert_eq!(parsed.max_supply, 5_000);
        assert_eq!(parsed.lockup_period, 10);
        assert_eq!(parsed.gold_minimum, 2_500);
        assert_eq!(parsed.bronze_minimum, params::BRONZE_MINIMUM);
    }

    #[test]
    fn test_rejects_burn_admin() {
        let toml = format!("[ledger]\nadmin = \"{}\"\n", crate::account::BURN_ADDRESS);
        assert!(parse_config(&toml).is_err());
    }

    #[test]
    fn test_rejects_zero_minimum_and_bad_level() {
        assert!(parse_config("[ledger]\nadmin = \"A\"\n[ledger.tiers]\nbronze_minimum = 0\n").is_err());
        assert!(parse_config("[ledger]\nadmin = \"A\"\n[logging]\nlevel = \"loud\"\n").is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.ledger.admin, default_admin());
    }
}
