//! Property tests for the ledger state machine
//!
//! Random operation sequences are applied to a funded ledger; after every
//! step the id, conservation, gating, score and atomicity rules are checked.

use proptest::prelude::*;
use review_ledger::{
    Identity, LedgerError, LedgerState, PackageId, ReviewId, ReviewParams, MIN_REVIEW_STAKE,
};
use std::collections::HashMap;

const LEDGER: &str = "ledger";
const IDENTITIES: [&str; 4] = ["alice", "bob", "carol", "dave"];

#[derive(Debug, Clone)]
enum Op {
    SubmitPackage { caller: usize },
    Stake { caller: usize, amount: u64 },
    Review { caller: usize, package: u64, score: i64 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..IDENTITIES.len()).prop_map(|caller| Op::SubmitPackage { caller }),
        (0..IDENTITIES.len(), 0u64..400).prop_map(|(caller, amount)| Op::Stake { caller, amount }),
        (0..IDENTITIES.len(), 0u64..8, -3i64..9)
            .prop_map(|(caller, package, score)| Op::Review { caller, package, score }),
    ]
}

fn funded_ledger(funds: &[u64]) -> LedgerState {
    let balances = IDENTITIES
        .iter()
        .zip(funds)
        .map(|(id, amount)| (Identity::from(*id), *amount))
        .chain([(Identity::from(LEDGER), 10_000)]);
    LedgerState::with_genesis(Identity::from(LEDGER), ReviewParams::default(), balances).unwrap()
}

proptest! {
    #[test]
    fn prop_ledger_invariants_hold(
        funds in prop::collection::vec(0u64..2000, IDENTITIES.len()),
        ops in prop::collection::vec(op_strategy(), 1..60),
    ) {
        let mut state = funded_ledger(&funds);
        let supply = state.total_supply();
        let mut expected_reputation: HashMap<u64, u64> = HashMap::new();
        let mut packages = 0u64;
        let mut reviews = 0u64;

        for op in ops {
            let before = state.clone();
            match op {
                Op::SubmitPackage { caller } => {
                    let caller = Identity::from(IDENTITIES[caller]);
                    let id = state.submit_package(&caller, "pkg", "1.0.0");
                    packages += 1;
                    prop_assert_eq!(id, PackageId(packages));
                }
                Op::Stake { caller, amount } => {
                    let caller = Identity::from(IDENTITIES[caller]);
                    let ledger = Identity::from(LEDGER);
                    let pair_before = before.balance_of(&caller) + before.balance_of(&ledger);

                    match state.stake_for_review(&caller, amount) {
                        Ok(flag) => {
                            prop_assert!(flag);
                            prop_assert!(amount <= before.balance_of(&caller));
                            prop_assert_eq!(
                                state.balance_of(&caller) + state.balance_of(&ledger),
                                pair_before
                            );
                            prop_assert_eq!(
                                state.stake_of(&caller),
                                before.stake_of(&caller) + amount
                            );
                        }
                        Err(err) => {
                            let is_balance_error =
                                matches!(err, LedgerError::InsufficientBalance { .. });
                            prop_assert!(is_balance_error);
                            prop_assert!(amount > before.balance_of(&caller));
                            prop_assert_eq!(&state, &before);
                        }
                    }
                }
                Op::Review { caller, package, score } => {
                    let caller = Identity::from(IDENTITIES[caller]);
                    let staked = before.stake_of(&caller);

                    match state.submit_review(&caller, PackageId(package), score, "") {
                        Ok(flag) => {
                            prop_assert!(flag);
                            prop_assert!(staked >= MIN_REVIEW_STAKE);
                            prop_assert!((0..=5).contains(&score));
                            reviews += 1;
                            let review = state.review(ReviewId(reviews)).unwrap();
                            prop_assert_eq!(review.package_id, PackageId(package));
                            // Reviews of ids not yet allocated never count
                            if package >= 1 && package <= packages {
                                *expected_reputation.entry(package).or_insert(0) += score as u64;
                            }
                        }
                        Err(LedgerError::InsufficientStake { .. }) => {
                            prop_assert!(staked < MIN_REVIEW_STAKE);
                            prop_assert_eq!(&state, &before);
                        }
                        Err(LedgerError::InvalidScore(raw)) => {
                            prop_assert!(staked >= MIN_REVIEW_STAKE);
                            prop_assert!(!(0..=5).contains(&raw));
                            prop_assert_eq!(&state, &before);
                        }
                        Err(other) => prop_assert!(false, "unexpected error {:?}", other),
                    }
                }
            }

            prop_assert_eq!(state.total_supply(), supply);
        }

        prop_assert_eq!(state.package_count() as u64, packages);
        prop_assert_eq!(state.review_count() as u64, reviews);
        for (id, package) in state.packages() {
            let expected = expected_reputation.get(&id.0).copied().unwrap_or(0);
            prop_assert_eq!(package.reputation, expected);
        }
    }

    #[test]
    fn prop_score_bound(score in any::<i64>()) {
        let mut state = funded_ledger(&[500, 0, 0, 0]);
        let alice = Identity::from("alice");
        state.stake_for_review(&alice, MIN_REVIEW_STAKE).unwrap();
        let package = state.submit_package(&alice, "pkg", "1.0.0");

        let result = state.submit_review(&alice, package, score, "");
        if (0..=5).contains(&score) {
            prop_assert!(result.is_ok());
            prop_assert_eq!(state.package(package).unwrap().reputation, score as u64);
        } else {
            prop_assert_eq!(result, Err(LedgerError::InvalidScore(score)));
        }
    }

    #[test]
    fn prop_stake_gate_ignores_review_history(
        stake in 0u64..300,
        reviews in 0usize..20,
    ) {
        let mut state = funded_ledger(&[1000, 0, 0, 0]);
        let alice = Identity::from("alice");
        state.stake_for_review(&alice, stake).unwrap();
        let package = state.submit_package(&alice, "pkg", "1.0.0");

        for _ in 0..reviews {
            let accepted = state.submit_review(&alice, package, 1, "").is_ok();
            prop_assert_eq!(accepted, stake >= MIN_REVIEW_STAKE);
        }
        prop_assert_eq!(state.stake_of(&alice), stake);
    }
}
