//! Account identities
//!
//! Callers reach the ledger already authenticated; an identity is an opaque
//! principal string compared by value.

use crate::error::ChainError;
use std::fmt;

/// The reserved burn/zero principal. It can never hold a balance.
pub const BURN_ADDRESS: &str = "SP000000000000000000002Q6VF78";

/// Maximum accepted length of a principal string.
pub const MAX_ACCOUNT_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        AccountId(id.into())
    }

    /// The default burn address.
    pub fn burn() -> Self {
        AccountId(BURN_ADDRESS.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses a principal typed by an operator, rejecting empty or
    /// whitespace-bearing input.
    pub fn parse(s: &str) -> Result<Self, ChainError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ChainError::ConfigError("Account id must not be empty".to_string()));
        }
        if trimmed.len() > MAX_ACCOUNT_LEN {
            return Err(ChainError::ConfigError(format!(
                "Account id too long: {} chars (max: {})",
                trimmed.len(),
                MAX_ACCOUNT_LEN
            )));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(ChainError::ConfigError(format!(
                "Account id must not contain whitespace: {:?}",
                trimmed
            )));
        }
        Ok(AccountId(trimmed.to_string()))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        AccountId(s.to_string())
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        AccountId(s)
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_accepts() {
        let id = AccountId::parse("  ST2CY5  ").unwrap();
        assert_eq!(id.as_str(), "ST2CY5");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(AccountId::parse("").is_err());
        assert!(AccountId::parse("ST2 CY5").is_err());
        assert!(AccountId::parse(&"A".repeat(MAX_ACCOUNT_LEN + 1)).is_err());
    }

    #[test]
    fn test_json_is_plain_string() {
        let id = AccountId::burn();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", BURN_ADDRESS));
    }
}
