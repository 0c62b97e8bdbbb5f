//! Balance and Stake Accounts
//!
//! Two identity-keyed counters: spendable balances and locked review stake.
//! Absent identities read as zero. Funds enter only through genesis credits
//! and move only through `lock_stake`, so total supply is fixed after genesis.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::LedgerError;
use super::types::Identity;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBook {
    balances: BTreeMap<Identity, u64>,
    stakes: BTreeMap<Identity, u64>,
}

impl AccountBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, identity: &Identity) -> u64 {
        self.balances.get(identity).copied().unwrap_or(0)
    }

    pub fn stake_of(&self, identity: &Identity) -> u64 {
        self.stakes.get(identity).copied().unwrap_or(0)
    }

    pub fn balances(&self) -> &BTreeMap<Identity, u64> {
        &self.balances
    }

    pub fn stakes(&self) -> &BTreeMap<Identity, u64> {
        &self.stakes
    }

    /// Sum of every balance, including the ledger-owned account
    pub fn total_supply(&self) -> u64 {
        self.balances.values().sum()
    }

    /// Sum of every locked stake, saturating at `u64::MAX`. Self-stakes by
    /// the sink leave supply unchanged, so stake is not bounded by supply.
    pub fn total_staked(&self) -> u64 {
        self.stakes
            .values()
            .fold(0u64, |total, stake| total.saturating_add(*stake))
    }

    /// Identities with a non-zero stake
    pub fn staker_count(&self) -> usize {
        self.stakes.values().filter(|s| **s > 0).count()
    }

    /// Mint funds into an account. Only used while building genesis state.
    pub(crate) fn credit(&mut self, identity: &Identity, amount: u64) -> Result<(), LedgerError> {
        let overflow = || LedgerError::BalanceOverflow {
            identity: identity.clone(),
        };

        self.total_supply().checked_add(amount).ok_or_else(overflow)?;
        let balance = self.balance_of(identity).checked_add(amount).ok_or_else(overflow)?;

        self.balances.insert(identity.clone(), balance);
        Ok(())
    }

    /// Move `amount` from the staker's balance into `sink` and record it as
    /// the staker's locked stake. All new values are computed before any
    /// write, so a failure leaves the book untouched.
    pub(crate) fn lock_stake(
        &mut self,
        staker: &Identity,
        sink: &Identity,
        amount: u64,
    ) -> Result<(), LedgerError> {
        let available = self.balance_of(staker);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                identity: staker.clone(),
                requested: amount,
                available,
            });
        }

        if amount == 0 {
            return Ok(());
        }

        let debited = available - amount;
        let sink_before = if sink == staker {
            debited
        } else {
            self.balance_of(sink)
        };
        let credited = sink_before
            .checked_add(amount)
            .ok_or_else(|| LedgerError::BalanceOverflow {
                identity: sink.clone(),
            })?;
        let staked = self
            .stake_of(staker)
            .checked_add(amount)
            .ok_or_else(|| LedgerError::BalanceOverflow {
                identity: staker.clone(),
            })?;

        // Sink goes second so a self-stake keeps the credited value
        self.balances.insert(staker.clone(), debited);
        self.balances.insert(sink.clone(), credited);
        self.stakes.insert(staker.clone(), staked);

        Ok(())
    }
}
