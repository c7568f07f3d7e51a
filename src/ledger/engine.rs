use crate::account::AccountId;
use crate::error::{ChainError, LedgerError};
use crate::ledger::validation::{
    check_invariants, ensure_admin, ensure_balance, ensure_not_paused, ensure_positive, ensure_recipient,
    resolve_tier,
};
use crate::ledger::{LedgerState, StakeKey, Tier};
use crate::params::{Amount, BlockHeight, LedgerParams};
use tracing::{debug, info};

/// Per-account view across all tiers.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AccountSummary {
    pub account: AccountId,
    pub balance: Amount,
    pub stakes: Vec<TierPosition>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TierPosition {
    pub tier: Tier,
    pub staked: Amount,
    pub lockup_end: BlockHeight,
}

/// The loyalty-token state machine.
///
/// Every mutating operation validates all of its preconditions before the
/// first write, so a rejected call leaves the state exactly as it was.
/// Callers that share a ledger between threads must serialize access; see
/// [`crate::shared::SharedLedger`].
#[derive(Debug, Clone)]
pub struct Ledger {
    params: LedgerParams,
    state: LedgerState,
}

impl Ledger {
    /// Creates an empty ledger with the default parameters.
    pub fn new(admin: AccountId) -> Self {
        Self { params: LedgerParams::default(), state: LedgerState::new(admin) }
    }

    /// Creates an empty ledger, refusing parameters that fail
    /// [`LedgerParams::validate`].
    pub fn with_params(admin: AccountId, params: LedgerParams) -> Result<Self, ChainError> {
        params.validate()?;
        Ok(Self { params, state: LedgerState::new(admin) })
    }

    /// Rebuilds a ledger around previously saved state, refusing state that
    /// breaks the accounting invariants.
    pub fn from_state(params: LedgerParams, state: LedgerState) -> Result<Self, ChainError> {
        params.validate()?;
        check_invariants(&state, &params)?;
        Ok(Self { params, state })
    }

    pub fn params(&self) -> &LedgerParams {
        &self.params
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn into_state(self) -> LedgerState {
        self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut LedgerState {
        &mut self.state
    }

    pub fn is_administrator(&self, caller: &AccountId) -> bool {
        *caller == self.state.admin
    }

    pub fn set_paused(&mut self, caller: &AccountId, pause: bool) -> Result<bool, LedgerError> {
        ensure_admin(&self.state, caller)?;

        self.state.paused = pause;
        info!(paused = pause, "ledger pause flag updated");
        Ok(pause)
    }

    pub fn initialize(&mut self, caller: &AccountId) -> Result<bool, LedgerError> {
        ensure_admin(&self.state, caller)?;
        if self.state.initialized {
            return Err(LedgerError::AlreadyInitialized);
        }

        for tier in Tier::ALL {
            self.state.reward_multipliers.insert(tier, tier.reward_multiplier());
        }
        self.state.initialized = true;
        info!("ledger initialized with reward multipliers");
        Ok(true)
    }

    pub fn mint(&mut self, caller: &AccountId, recipient: &AccountId, amount: Amount) -> Result<bool, LedgerError> {
        ensure_admin(&self.state, caller)?;
        ensure_recipient(&self.params, recipient)?;
        ensure_positive(amount)?;
        let new_supply = self
            .state
            .total_supply
            .checked_add(amount)
            .filter(|supply| *supply <= self.params.max_supply)
            .ok_or(LedgerError::SupplyExceeded)?;

        let credited = self.state.balance_of(recipient) + amount;
        self.state.set_balance(recipient, credited);
        self.state.total_supply = new_supply;
        info!(recipient = %recipient, amount, total_supply = new_supply, "minted");
        Ok(true)
    }

    pub fn transfer(&mut self, caller: &AccountId, recipient: &AccountId, amount: Amount) -> Result<bool, LedgerError> {
        ensure_not_paused(&self.state)?;
        ensure_recipient(&self.params, recipient)?;
        ensure_positive(amount)?;
        let balance = ensure_balance(&self.state, caller, amount)?;

        self.state.set_balance(caller, balance - amount);
        // Read after the debit so a self-transfer nets to zero.
        let credited = self.state.balance_of(recipient) + amount;
        self.state.set_balance(recipient, credited);
        debug!(from = %caller, to = %recipient, amount, "transferred");
        Ok(true)
    }

    /// Locks `amount` of the caller's balance in `tier` until
    /// `height + lockup_period`. Stakes are not additive: a key with an open
    /// lock rejects further stakes until it is fully withdrawn. A lock that
    /// would end past `BlockHeight::MAX` is refused with `LockActive`.
    pub fn stake(
        &mut self,
        caller: &AccountId,
        amount: Amount,
        tier: u64,
        height: BlockHeight,
    ) -> Result<bool, LedgerError> {
        let tier = resolve_tier(tier)?;
        ensure_not_paused(&self.state)?;
        ensure_positive(amount)?;
        if amount < self.params.tier_minimum(tier) {
            return Err(LedgerError::InvalidAmount);
        }
        let balance = ensure_balance(&self.state, caller, amount)?;
        let key = StakeKey::new(caller.clone(), tier);
        if self.state.lockups.contains_key(&key) {
            return Err(LedgerError::LockExists);
        }
        let unlock_at = height.checked_add(self.params.lockup_period).ok_or(LedgerError::LockActive)?;

        self.state.set_balance(caller, balance - amount);
        let staked = self.state.staked_of(&key) + amount;
        self.state.set_staked(&key, staked);
        self.state.lockups.insert(key, unlock_at);
        debug!(account = %caller, %tier, amount, unlock_at, "staked");
        Ok(true)
    }

    /// Returns staked funds to the caller's balance once the lock has
    /// expired. A key without a lock is always withdrawable.
    pub fn unstake(
        &mut self,
        caller: &AccountId,
        amount: Amount,
        tier: u64,
        height: BlockHeight,
    ) -> Result<bool, LedgerError> {
        let tier = resolve_tier(tier)?;
        ensure_not_paused(&self.state)?;
        ensure_positive(amount)?;
        let key = StakeKey::new(caller.clone(), tier);
        let staked = self.state.staked_of(&key);
        if staked < amount {
            return Err(LedgerError::InsufficientStake);
        }
        if height < self.state.lockup_end_of(&key) {
            return Err(LedgerError::LockActive);
        }

        self.state.set_staked(&key, staked - amount);
        let credited = self.state.balance_of(caller) + amount;
        self.state.set_balance(caller, credited);
        debug!(account = %caller, %tier, amount, remaining = staked - amount, "unstaked");
        Ok(true)
    }

    pub fn get_balance(&self, account: &AccountId) -> Amount {
        self.state.balance_of(account)
    }

    /// Unknown tier codes read as zero.
    pub fn get_staked(&self, account: &AccountId, tier: u64) -> Amount {
        match Tier::from_code(tier) {
            Ok(tier) => self.state.staked_of(&StakeKey::new(account.clone(), tier)),
            Err(_) => 0,
        }
    }

    /// Unknown tier codes read as zero.
    pub fn get_lockup_end(&self, account: &AccountId, tier: u64) -> BlockHeight {
        match Tier::from_code(tier) {
            Ok(tier) => self.state.lockup_end_of(&StakeKey::new(account.clone(), tier)),
            Err(_) => 0,
        }
    }

    pub fn total_supply(&self) -> Amount {
        self.state.total_supply
    }

    pub fn max_supply(&self) -> Amount {
        self.params.max_supply
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    pub fn is_initialized(&self) -> bool {
        self.state.initialized
    }

    pub fn admin(&self) -> &AccountId {
        &self.state.admin
    }

    pub fn block_height(&self) -> BlockHeight {
        self.state.block_height
    }

    /// `None` until the ledger has been initialized.
    pub fn reward_multiplier(&self, tier: Tier) -> Option<u64> {
        self.state.reward_multipliers.get(&tier).copied()
    }

    pub fn tier_minimum(&self, tier: Tier) -> Amount {
        self.params.tier_minimum(tier)
    }

    pub fn account_summary(&self, account: &AccountId) -> AccountSummary {
        let stakes = Tier::ALL
            .iter()
            .map(|tier| {
                let key = StakeKey::new(account.clone(), *tier);
                TierPosition {
                    tier: *tier,
                    staked: self.state.staked_of(&key),
                    lockup_end: self.state.lockup_end_of(&key),
                }
            })
            .collect();
        AccountSummary { account: account.clone(), balance: self.state.balance_of(account), stakes }
    }

    pub fn check_invariants(&self) -> Result<(), ChainError> {
        check_invariants(&self.state, &self.params)
    }
}
