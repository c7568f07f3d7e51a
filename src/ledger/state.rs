use crate::account::AccountId;
use crate::error::ChainError;
use crate::ledger::Tier;
use crate::params::{Amount, BlockHeight};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

pub type StateRoot = [u8; 32];

/// Composite key for per-tier stake bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct StakeKey {
    pub account: AccountId,
    pub tier: Tier,
}

impl StakeKey {
    pub fn new(account: AccountId, tier: Tier) -> Self {
        Self { account, tier }
    }
}

/// The complete mutable state of one ledger.
///
/// Maps are ordered so that the bincode encoding, and with it the state
/// root, is identical for identical states.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LedgerState {
    pub admin: AccountId,
    pub paused: bool,
    pub total_supply: Amount,
    #[serde(with = "entries")]
    pub balances: BTreeMap<AccountId, Amount>,
    #[serde(with = "entries")]
    pub staked: BTreeMap<StakeKey, Amount>,
    #[serde(with = "entries")]
    pub lockups: BTreeMap<StakeKey, BlockHeight>,
    pub initialized: bool,
    #[serde(with = "entries")]
    pub reward_multipliers: BTreeMap<Tier, u64>,
    /// Highest block height of a successful call made through
    /// [`Ledger::apply`](crate::ledger::Ledger::apply). Direct operation
    /// calls do not move it.
    pub block_height: BlockHeight,
}

impl LedgerState {
    pub fn new(admin: AccountId) -> Self {
        Self {
            admin,
            paused: false,
            total_supply: 0,
            balances: BTreeMap::new(),
            staked: BTreeMap::new(),
            lockups: BTreeMap::new(),
            initialized: false,
            reward_multipliers: BTreeMap::new(),
            block_height: 0,
        }
    }

    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn staked_of(&self, key: &StakeKey) -> Amount {
        self.staked.get(key).copied().unwrap_or(0)
    }

    pub fn lockup_end_of(&self, key: &StakeKey) -> BlockHeight {
        self.lockups.get(key).copied().unwrap_or(0)
    }

    pub fn sum_balances(&self) -> Amount {
        self.balances.values().fold(0, |acc, v| acc.saturating_add(*v))
    }

    pub fn sum_staked(&self) -> Amount {
        self.staked.values().fold(0, |acc, v| acc.saturating_add(*v))
    }

    /// Sets a balance, dropping the entry when it reaches zero.
    pub(crate) fn set_balance(&mut self, account: &AccountId, amount: Amount) {
        if amount == 0 {
            self.balances.remove(account);
        } else {
            self.balances.insert(account.clone(), amount);
        }
    }

    /// Sets a stake, dropping the entry and its lock when it reaches zero.
    pub(crate) fn set_staked(&mut self, key: &StakeKey, amount: Amount) {
        if amount == 0 {
            self.staked.remove(key);
            self.lockups.remove(key);
        } else {
            self.staked.insert(key.clone(), amount);
        }
    }

    pub(crate) fn observe_height(&mut self, height: BlockHeight) {
        self.block_height = self.block_height.max(height);
    }

    /// SHA-256 over the canonical bincode encoding.
    pub fn state_root(&self) -> Result<StateRoot, ChainError> {
        let encoded = bincode::serialize(self)?;
        let mut hasher = Sha256::new();
        hasher.update(b"loyalty-state");
        hasher.update(&encoded);
        Ok(hasher.finalize().into())
    }

    pub fn state_root_hex(&self) -> Result<String, ChainError> {
        Ok(hex::encode(self.state_root()?))
    }
}

/// Encodes a map as a list of `(key, value)` pairs so that struct and enum
/// keys survive formats whose maps only take string keys.
mod entries {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<K, V, S>(map: &BTreeMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Serialize,
        V: Serialize,
        S: Serializer,
    {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<BTreeMap<K, V>, D::Error>
    where
        K: Deserialize<'de> + Ord,
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let pairs = Vec::<(K, V)>::deserialize(deserializer)?;
        let expected = pairs.len();
        let map: BTreeMap<K, V> = pairs.into_iter().collect();
        if map.len() != expected {
            return Err(D::Error::custom("duplicate key in map entries"));
        }
        Ok(map)
    }
}
