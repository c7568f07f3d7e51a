//! Ledger calls as data
//!
//! The transaction layer in front of the ledger hands over one
//! [`CallEnvelope`] per call: who is calling, at which block height, and
//! what they asked for. Envelopes can be stored and replayed to rebuild a
//! ledger deterministically.

use crate::account::AccountId;
use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::params::{Amount, BlockHeight};
use sha2::{Digest, Sha256};
use tracing::debug;

pub type CallHash = [u8; 32];

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerCall {
    SetPaused { pause: bool },
    Initialize,
    Mint { recipient: AccountId, amount: Amount },
    Transfer { recipient: AccountId, amount: Amount },
    /// `tier` is the raw code so that unknown tiers reach the ledger.
    Stake { amount: Amount, tier: u64 },
    Unstake { amount: Amount, tier: u64 },
}

impl LedgerCall {
    pub fn name(&self) -> &'static str {
        match self {
            LedgerCall::SetPaused { .. } => "set_paused",
            LedgerCall::Initialize => "initialize",
            LedgerCall::Mint { .. } => "mint",
            LedgerCall::Transfer { .. } => "transfer",
            LedgerCall::Stake { .. } => "stake",
            LedgerCall::Unstake { .. } => "unstake",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CallEnvelope {
    pub caller: AccountId,
    pub block_height: BlockHeight,
    pub call: LedgerCall,
}

impl CallEnvelope {
    pub fn new(caller: AccountId, block_height: BlockHeight, call: LedgerCall) -> Self {
        Self { caller, block_height, call }
    }

    pub fn hash_str(&self) -> String {
        hex::encode(self.hash())
    }

    /// Digest of the envelope contents. Strings are length-prefixed so that
    /// adjacent fields cannot run into each other.
    pub fn hash(&self) -> CallHash {
        let mut hasher = Sha256::new();
        hasher.update(self.call.name().as_bytes());
        update_str(&mut hasher, self.caller.as_str());
        hasher.update(self.block_height.to_le_bytes());
        match &self.call {
            LedgerCall::SetPaused { pause } => hasher.update([*pause as u8]),
            LedgerCall::Initialize => {}
            LedgerCall::Mint { recipient, amount } | LedgerCall::Transfer { recipient, amount } => {
                update_str(&mut hasher, recipient.as_str());
                hasher.update(amount.to_le_bytes());
            }
            LedgerCall::Stake { amount, tier } | LedgerCall::Unstake { amount, tier } => {
                hasher.update(amount.to_le_bytes());
                hasher.update(tier.to_le_bytes());
            }
        }
        hasher.finalize().into()
    }
}

fn update_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

/// Outcome of one replayed call.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Receipt {
    pub call_hash: String,
    pub call: String,
    pub outcome: Result<bool, LedgerError>,
}

impl Receipt {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

impl Ledger {
    /// Dispatches one envelope to the matching operation. This is the only
    /// place the ledger's block height advances, and only on success.
    pub fn apply(&mut self, envelope: &CallEnvelope) -> Result<bool, LedgerError> {
        let caller = &envelope.caller;
        let height = envelope.block_height;
        let outcome = match &envelope.call {
            LedgerCall::SetPaused { pause } => self.set_paused(caller, *pause),
            LedgerCall::Initialize => self.initialize(caller),
            LedgerCall::Mint { recipient, amount } => self.mint(caller, recipient, *amount),
            LedgerCall::Transfer { recipient, amount } => self.transfer(caller, recipient, *amount),
            LedgerCall::Stake { amount, tier } => self.stake(caller, *amount, *tier, height),
            LedgerCall::Unstake { amount, tier } => self.unstake(caller, *amount, *tier, height),
        };
        match outcome {
            Ok(_) => self.state_mut().observe_height(height),
            Err(err) => debug!(call = envelope.call.name(), caller = %caller, code = err.code(), "call rejected"),
        }
        outcome
    }

    /// Applies every envelope in order. Rejected calls are recorded in their
    /// receipt and do not stop the replay.
    pub fn replay<'a, I>(&mut self, envelopes: I) -> Vec<Receipt>
    where
        I: IntoIterator<Item = &'a CallEnvelope>,
    {
        envelopes
            .into_iter()
            .map(|envelope| Receipt {
                call_hash: envelope.hash_str(),
                call: envelope.call.name().to_string(),
                outcome: self.apply(envelope),
            })
            .collect()
    }
}
