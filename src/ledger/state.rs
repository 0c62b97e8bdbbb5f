//! Ledger State Machine
//!
//! Owns packages, reviews and the account book. Each operation validates
//! everything it needs before the first write, so a rejected call leaves the
//! state exactly as it found it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use super::accounts::AccountBook;
use super::error::LedgerError;
use super::types::{
    Identity, Package, PackageId, Review, ReviewId, ReviewParams, ReviewerStatus, Score,
};

/// Aggregate counters over the whole ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStats {
    pub packages: usize,
    pub reviews: usize,
    pub stakers: usize,
    pub total_staked: u64,
    pub total_supply: u64,
    pub ledger_balance: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    /// Account that receives all staked funds
    ledger_account: Identity,
    params: ReviewParams,
    packages: BTreeMap<PackageId, Package>,
    reviews: BTreeMap<ReviewId, Review>,
    accounts: AccountBook,
}

impl LedgerState {
    pub fn new(ledger_account: Identity, params: ReviewParams) -> Self {
        Self {
            ledger_account,
            params,
            packages: BTreeMap::new(),
            reviews: BTreeMap::new(),
            accounts: AccountBook::new(),
        }
    }

    /// Build a ledger seeded with initial balances. Repeated identities are
    /// summed.
    pub fn with_genesis<I>(
        ledger_account: Identity,
        params: ReviewParams,
        balances: I,
    ) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = (Identity, u64)>,
    {
        let mut state = Self::new(ledger_account, params);
        for (identity, amount) in balances {
            state.accounts.credit(&identity, amount)?;
        }

        info!(
            ledger_account = %state.ledger_account,
            accounts = state.accounts.balances().len(),
            total_supply = state.accounts.total_supply(),
            "Ledger genesis complete"
        );

        Ok(state)
    }

    /// Register a package. Names and versions are free-form and need not be
    /// unique.
    pub fn submit_package(&mut self, caller: &Identity, name: &str, version: &str) -> PackageId {
        let package_id = PackageId(self.packages.len() as u64 + 1);
        self.packages.insert(
            package_id,
            Package::new(caller.clone(), name.to_string(), version.to_string()),
        );

        info!(
            caller = %caller,
            package_id = %package_id,
            name = %name,
            version = %version,
            "Package submitted"
        );

        package_id
    }

    /// Lock `amount` of the caller's balance as review stake
    pub fn stake_for_review(&mut self, caller: &Identity, amount: u64) -> Result<bool, LedgerError> {
        if let Err(e) = self
            .accounts
            .lock_stake(caller, &self.ledger_account, amount)
        {
            warn!(caller = %caller, amount = amount, error = %e, "Stake rejected");
            return Err(e);
        }

        if amount == 0 {
            debug!(caller = %caller, "Zero stake accepted as no-op");
        } else {
            info!(
                caller = %caller,
                amount = amount,
                stake = self.accounts.stake_of(caller),
                "Stake locked for review"
            );
        }

        Ok(true)
    }

    /// Record a review. Stake gates the call but is not consumed. A review
    /// of an unknown package is kept without touching any reputation.
    pub fn submit_review(
        &mut self,
        caller: &Identity,
        package_id: PackageId,
        score: i64,
        comment: &str,
    ) -> Result<bool, LedgerError> {
        self.submit_review_with_id(caller, package_id, score, comment)
            .map(|_| true)
    }

    /// Same as `submit_review`, returning the id the review was stored under
    pub fn submit_review_with_id(
        &mut self,
        caller: &Identity,
        package_id: PackageId,
        score: i64,
        comment: &str,
    ) -> Result<ReviewId, LedgerError> {
        let staked = self.accounts.stake_of(caller);
        if staked < self.params.min_review_stake {
            warn!(caller = %caller, staked = staked, "Review rejected: insufficient stake");
            return Err(LedgerError::InsufficientStake {
                identity: caller.clone(),
                required: self.params.min_review_stake,
                staked,
            });
        }

        let score = Score::new(score).inspect_err(|_| {
            warn!(caller = %caller, score = score, "Review rejected: invalid score");
        })?;

        let review_id = ReviewId(self.reviews.len() as u64 + 1);
        self.reviews.insert(
            review_id,
            Review {
                package_id,
                reviewer: caller.clone(),
                score,
                comment: comment.to_string(),
            },
        );

        match self.packages.get_mut(&package_id) {
            Some(package) => {
                package.reputation = package.reputation.saturating_add(u64::from(score.value()));
                info!(
                    caller = %caller,
                    review_id = %review_id,
                    package_id = %package_id,
                    score = score.value(),
                    reputation = package.reputation,
                    "Review accepted"
                );
            }
            None => {
                warn!(
                    caller = %caller,
                    review_id = %review_id,
                    package_id = %package_id,
                    "Review recorded for unknown package"
                );
            }
        }

        Ok(review_id)
    }

    pub fn package(&self, package_id: PackageId) -> Option<&Package> {
        self.packages.get(&package_id)
    }

    pub fn review(&self, review_id: ReviewId) -> Option<&Review> {
        self.reviews.get(&review_id)
    }

    pub fn packages(&self) -> impl Iterator<Item = (PackageId, &Package)> {
        self.packages.iter().map(|(id, p)| (*id, p))
    }

    pub fn reviews(&self) -> impl Iterator<Item = (ReviewId, &Review)> {
        self.reviews.iter().map(|(id, r)| (*id, r))
    }

    pub fn reviews_for_package(
        &self,
        package_id: PackageId,
    ) -> impl Iterator<Item = (ReviewId, &Review)> {
        self.reviews().filter(move |(_, r)| r.package_id == package_id)
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    pub fn review_count(&self) -> usize {
        self.reviews.len()
    }

    pub fn balance_of(&self, identity: &Identity) -> u64 {
        self.accounts.balance_of(identity)
    }

    pub fn stake_of(&self, identity: &Identity) -> u64 {
        self.accounts.stake_of(identity)
    }

    pub fn reviewer_status(&self, identity: &Identity) -> ReviewerStatus {
        ReviewerStatus::from_stake(self.stake_of(identity), &self.params)
    }

    pub fn total_supply(&self) -> u64 {
        self.accounts.total_supply()
    }

    pub fn accounts(&self) -> &AccountBook {
        &self.accounts
    }

    pub fn ledger_account(&self) -> &Identity {
        &self.ledger_account
    }

    pub fn params(&self) -> &ReviewParams {
        &self.params
    }

    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            packages: self.packages.len(),
            reviews: self.reviews.len(),
            stakers: self.accounts.staker_count(),
            total_staked: self.accounts.total_staked(),
            total_supply: self.accounts.total_supply(),
            ledger_balance: self.accounts.balance_of(&self.ledger_account),
        }
    }
}
