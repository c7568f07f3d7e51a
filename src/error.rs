//! Error types for the loyalty ledger

use std::fmt;

/// Rejection reasons returned by ledger operations.
///
/// Every failing call leaves the ledger untouched, so each variant is a
/// permanent rejection of that one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum LedgerError {
    #[error("caller is not the administrator")]
    Unauthorized,
    #[error("ledger is already initialized")]
    AlreadyInitialized,
    #[error("recipient is the burn address")]
    InvalidRecipient,
    #[error("invalid amount")]
    InvalidAmount,
    #[error("mint would exceed the maximum supply")]
    SupplyExceeded,
    #[error("ledger is paused")]
    Paused,
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("insufficient stake")]
    InsufficientStake,
    #[error("unknown staking tier")]
    InvalidTier,
    #[error("a stake lock already exists for this tier")]
    LockExists,
    #[error("stake lock has not expired")]
    LockActive,
}

impl LedgerError {
    /// Numeric code handed to the transaction layer.
    pub fn code(&self) -> u32 {
        match self {
            LedgerError::Unauthorized => 100,
            LedgerError::InsufficientBalance => 101,
            LedgerError::InsufficientStake => 102,
            LedgerError::SupplyExceeded => 103,
            LedgerError::Paused => 104,
            LedgerError::InvalidRecipient => 105,
            LedgerError::InvalidAmount => 106,
            LedgerError::LockActive => 107,
            LedgerError::InvalidTier => 108,
            LedgerError::AlreadyInitialized => 109,
            LedgerError::LockExists => 110,
        }
    }
}

/// Errors raised around the ledger: configuration, snapshots and I/O.
#[derive(Debug, Clone)]
pub enum ChainError {
    Ledger(LedgerError),
    ConfigError(String),
    SnapshotError(String),
    IoError(String),
    BincodeError(String),
    JsonError(String),
    InvariantViolation(String),
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChainError::Ledger(err) => write!(f, "Ledger rejected call ({}): {}", err.code(), err),
            ChainError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            ChainError::SnapshotError(msg) => write!(f, "Snapshot error: {}", msg),
            ChainError::IoError(msg) => write!(f, "IO error: {}", msg),
            ChainError::BincodeError(msg) => write!(f, "Bincode error: {}", msg),
            ChainError::JsonError(msg) => write!(f, "JSON error: {}", msg),
            ChainError::InvariantViolation(msg) => write!(f, "Invariant violated: {}", msg),
        }
    }
}

impl std::error::Error for ChainError {}

impl From<LedgerError> for ChainError {
    fn from(err: LedgerError) -> Self {
        ChainError::Ledger(err)
    }
}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::IoError(err.to_string())
    }
}

impl From<Box<bincode::ErrorKind>> for ChainError {
    fn from(err: Box<bincode::ErrorKind>) -> Self {
        ChainError::BincodeError(err.to_string())
    }
}

impl From<serde_json::Error> for ChainError {
    fn from(err: serde_json::Error) -> Self {
        ChainError::JsonError(err.to_string())
    }
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        ChainError::ConfigError(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let all = [
            LedgerError::Unauthorized,
            LedgerError::AlreadyInitialized,
            LedgerError::InvalidRecipient,
            LedgerError::InvalidAmount,
            LedgerError::SupplyExceeded,
            LedgerError::Paused,
            LedgerError::InsufficientBalance,
            LedgerError::InsufficientStake,
            LedgerError::InvalidTier,
            LedgerError::LockExists,
            LedgerError::LockActive,
        ];
        let mut codes: Vec<u32> = all.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn test_ledger_error_wraps_with_code() {
        let err: ChainError = LedgerError::Paused.into();
        assert_eq!(err.to_string(), "Ledger rejected call (104): ledger is paused");
    }
}
