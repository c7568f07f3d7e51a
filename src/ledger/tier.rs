use crate::error::LedgerError;
use std::fmt;
use std::str::FromStr;

/// Staking tier. Callers address tiers by their numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Bronze, Tier::Silver, Tier::Gold];

    pub fn code(self) -> u64 {
        match self {
            Tier::Bronze => 1,
            Tier::Silver => 2,
            Tier::Gold => 3,
        }
    }

    /// Resolves a caller-supplied tier code.
    pub fn from_code(code: u64) -> Result<Tier, LedgerError> {
        match code {
            1 => Ok(Tier::Bronze),
            2 => Ok(Tier::Silver),
            3 => Ok(Tier::Gold),
            _ => Err(LedgerError::InvalidTier),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tier::Bronze => "bronze",
            Tier::Silver => "silver",
            Tier::Gold => "gold",
        }
    }

    /// Multiplier written by `initialize`.
    pub fn reward_multiplier(self) -> u64 {
        match self {
            Tier::Bronze => 1,
            Tier::Silver => 2,
            Tier::Gold => 3,
        }
    }
}

impl TryFrom<u64> for Tier {
    type Error = LedgerError;

    fn try_from(code: u64) -> Result<Self, Self::Error> {
        Tier::from_code(code)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts either a tier name or its numeric code.
impl FromStr for Tier {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bronze" => Ok(Tier::Bronze),
            "silver" => Ok(Tier::Silver),
            "gold" => Ok(Tier::Gold),
            other => other
                .parse::<u64>()
                .map_err(|_| LedgerError::InvalidTier)
                .and_then(Tier::from_code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for tier in Tier::ALL {
            assert_eq!(Tier::from_code(tier.code()), Ok(tier));
        }
    }

    #[test]
    fn test_unknown_codes_rejected() {
        for code in [0, 4, 999, u64::MAX] {
            assert_eq!(Tier::from_code(code), Err(LedgerError::InvalidTier));
        }
    }

    #[test]
    fn test_parse_names_and_codes() {
        assert_eq!("Gold".parse::<Tier>(), Ok(Tier::Gold));
        assert_eq!("2".parse::<Tier>(), Ok(Tier::Silver));
        assert_eq!("platinum".parse::<Tier>(), Err(LedgerError::InvalidTier));
    }
}
