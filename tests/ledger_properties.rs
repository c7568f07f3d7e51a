//! Property tests: accounting invariants under arbitrary call sequences

use loyaltychain::account::AccountId;
use loyaltychain::error::LedgerError;
use loyaltychain::ledger::Ledger;
use loyaltychain::params::LedgerParams;
use loyaltychain::transaction::{CallEnvelope, LedgerCall};
use proptest::prelude::*;

const ACCOUNTS: [&str; 4] = ["admin", "alice", "bob", "SP000000000000000000002Q6VF78"];

fn arb_account() -> impl Strategy<Value = AccountId> {
    (0..ACCOUNTS.len()).prop_map(|i| AccountId::from(ACCOUNTS[i]))
}

fn arb_amount() -> impl Strategy<Value = u128> {
    prop_oneof![
        Just(0u128),
        1u128..20_000,
        Just(1_000_000_000u128),
        Just(u128::MAX),
    ]
}

fn arb_tier() -> impl Strategy<Value = u64> {
    prop_oneof![4 => 1u64..=3, 1 => Just(0u64), 1 => Just(999u64)]
}

fn arb_call() -> impl Strategy<Value = LedgerCall> {
    prop_oneof![
        any::<bool>().prop_map(|pause| LedgerCall::SetPaused { pause }),
        Just(LedgerCall::Initialize),
        (arb_account(), arb_amount()).prop_map(|(recipient, amount)| LedgerCall::Mint { recipient, amount }),
        (arb_account(), arb_amount()).prop_map(|(recipient, amount)| LedgerCall::Transfer { recipient, amount }),
        (arb_amount(), arb_tier()).prop_map(|(amount, tier)| LedgerCall::Stake { amount, tier }),
        (arb_amount(), arb_tier()).prop_map(|(amount, tier)| LedgerCall::Unstake { amount, tier }),
    ]
}

/// Envelopes with non-decreasing block heights.
fn arb_envelopes() -> impl Strategy<Value = Vec<CallEnvelope>> {
    prop::collection::vec((arb_account(), 0u64..800, arb_call()), 1..60).prop_map(|steps| {
        let mut height = 0u64;
        steps
            .into_iter()
            .map(|(caller, step, call)| {
                height += step;
                CallEnvelope::new(caller, height, call)
            })
            .collect()
    })
}

proptest! {
    /// Conservation, ceiling, lock/stake pairing after every step
    #[test]
    fn invariants_hold_after_every_call(envelopes in arb_envelopes()) {
        let mut ledger = Ledger::new(AccountId::from("admin"));
        for envelope in &envelopes {
            let _ = ledger.apply(envelope);
            prop_assert!(ledger.check_invariants().is_ok(), "{:?}", ledger.check_invariants());
            prop_assert!(ledger.total_supply() <= ledger.max_supply());
        }
    }

    /// A rejected call leaves the state byte-for-byte unchanged
    #[test]
    fn rejected_calls_do_not_mutate(envelopes in arb_envelopes()) {
        let mut ledger = Ledger::new(AccountId::from("admin"));
        for envelope in &envelopes {
            let before = ledger.state().clone();
            if ledger.apply(envelope).is_err() {
                prop_assert_eq!(ledger.state(), &before);
            }
        }
    }

    /// Replaying the same calls always yields the same state
    #[test]
    fn replay_is_deterministic(envelopes in arb_envelopes()) {
        let mut first = Ledger::new(AccountId::from("admin"));
        let mut second = Ledger::new(AccountId::from("admin"));
        let a = first.replay(&envelopes);
        let b = second.replay(&envelopes);
        prop_assert_eq!(a, b);
        prop_assert_eq!(first.state().state_root().unwrap(), second.state().state_root().unwrap());
    }

    /// Unstake is refused strictly before the lock height and allowed from it on
    #[test]
    fn lockup_gates_unstake(stake_at in 0u64..100_000, wait in 0u64..3_000, tier in 1u64..=3) {
        let admin = AccountId::from("admin");
        let alice = AccountId::from("alice");
        let mut ledger = Ledger::new(admin.clone());
        ledger.mint(&admin, &alice, 10_000).unwrap();
        ledger.stake(&alice, 10_000, tier, stake_at).unwrap();

        let unlock = ledger.get_lockup_end(&alice, tier);
        prop_assert_eq!(unlock, stake_at + LedgerParams::default().lockup_period);

        let result = ledger.unstake(&alice, 10_000, tier, stake_at + wait);
        if stake_at + wait < unlock {
            prop_assert_eq!(result, Err(LedgerError::LockActive));
        } else {
            prop_assert_eq!(result, Ok(true));
            // Slot is free again.
            prop_assert_eq!(ledger.stake(&alice, 10_000, tier, stake_at + wait), Ok(true));
        }
    }

    /// Mints never push supply past the ceiling
    #[test]
    fn mints_respect_ceiling(amounts in prop::collection::vec(1u128..400_000_000, 1..20)) {
        let admin = AccountId::from("admin");
        let mut ledger = Ledger::new(admin.clone());
        let mut expected = 0u128;
        for amount in amounts {
            match ledger.mint(&admin, &AccountId::from("alice"), amount) {
                Ok(_) => expected += amount,
                Err(err) => {
                    prop_assert_eq!(err, LedgerError::SupplyExceeded);
                    prop_assert!(expected + amount > ledger.max_supply());
                }
            }
            prop_assert_eq!(ledger.total_supply(), expected);
        }
    }
}
