use crate::account::AccountId;
use crate::error::{ChainError, LedgerError};
use crate::ledger::{LedgerState, StakeKey, Tier};
use crate::params::{Amount, LedgerParams};

pub fn ensure_admin(state: &LedgerState, caller: &AccountId) -> Result<(), LedgerError> {
    if *caller != state.admin {
        return Err(LedgerError::Unauthorized);
    }
    Ok(())
}

pub fn ensure_not_paused(state: &LedgerState) -> Result<(), LedgerError> {
    if state.paused {
        return Err(LedgerError::Paused);
    }
    Ok(())
}

pub fn ensure_recipient(params: &LedgerParams, recipient: &AccountId) -> Result<(), LedgerError> {
    if params.is_burn_address(recipient) {
        return Err(LedgerError::InvalidRecipient);
    }
    Ok(())
}

pub fn ensure_positive(amount: Amount) -> Result<(), LedgerError> {
    if amount == 0 {
        return Err(LedgerError::InvalidAmount);
    }
    Ok(())
}

pub fn resolve_tier(code: u64) -> Result<Tier, LedgerError> {
    Tier::from_code(code)
}

/// Returns the caller's balance if it covers `amount`.
pub fn ensure_balance(state: &LedgerState, account: &AccountId, amount: Amount) -> Result<Amount, LedgerError> {
    let balance = state.balance_of(account);
    if balance < amount {
        return Err(LedgerError::InsufficientBalance);
    }
    Ok(balance)
}

/// Checks the accounting invariants that must hold after every successful
/// operation. Returns the first violation found.
pub fn check_invariants(state: &LedgerState, params: &LedgerParams) -> Result<(), ChainError> {
    if state.total_supply > params.max_supply {
        return Err(ChainError::InvariantViolation(format!(
            "total supply {} exceeds maximum {}",
            state.total_supply, params.max_supply
        )));
    }

    let held = state
        .sum_balances()
        .checked_add(state.sum_staked())
        .ok_or_else(|| ChainError::InvariantViolation("holdings overflow".to_string()))?;
    if held != state.total_supply {
        return Err(ChainError::InvariantViolation(format!(
            "total supply {} does not match holdings {}",
            state.total_supply, held
        )));
    }

    if state.balances.contains_key(&params.burn_address) {
        return Err(ChainError::InvariantViolation("burn address holds a balance".to_string()));
    }

    for (key, amount) in &state.staked {
        if *amount > 0 && !state.lockups.contains_key(key) {
            return Err(ChainError::InvariantViolation(format!(
                "stake of {} for {} has no lock",
                amount,
                describe(key)
            )));
        }
    }

    for key in state.lockups.keys() {
        if state.staked_of(key) == 0 {
            return Err(ChainError::InvariantViolation(format!(
                "lock for {} has no stake",
                describe(key)
            )));
        }
    }

    Ok(())
}

fn describe(key: &StakeKey) -> String {
    format!("{}/{}", key.account, key.tier)
}
