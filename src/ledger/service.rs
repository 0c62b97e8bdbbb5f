//! Ledger Service - Single-Writer Front
//!
//! Shares one `LedgerState` between concurrent callers. Every mutation runs
//! its whole check-then-apply under the write lock; queries take the read
//! lock and return owned copies.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::error::LedgerError;
use super::state::{LedgerState, LedgerStats};
use super::types::{Identity, Package, PackageId, Review, ReviewId, ReviewerStatus};

/// Balance, stake and qualification of one identity at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountView {
    pub identity: Identity,
    pub balance: u64,
    pub stake: u64,
    pub status: ReviewerStatus,
}

#[derive(Clone)]
pub struct LedgerService {
    state: Arc<RwLock<LedgerState>>,
}

impl LedgerService {
    pub fn new(state: LedgerState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub async fn submit_package(&self, caller: &Identity, name: &str, version: &str) -> PackageId {
        let mut state = self.state.write().await;
        state.submit_package(caller, name, version)
    }

    /// Stake and return the caller's account as it stands after the call
    pub async fn stake_for_review(
        &self,
        caller: &Identity,
        amount: u64,
    ) -> Result<AccountView, LedgerError> {
        let mut state = self.state.write().await;
        state.stake_for_review(caller, amount)?;
        Ok(account_view(&state, caller))
    }

    /// Submit a review and return the id it was stored under
    pub async fn submit_review(
        &self,
        caller: &Identity,
        package_id: PackageId,
        score: i64,
        comment: &str,
    ) -> Result<ReviewId, LedgerError> {
        let mut state = self.state.write().await;
        state.submit_review_with_id(caller, package_id, score, comment)
    }

    pub async fn package(&self, package_id: PackageId) -> Option<Package> {
        self.state.read().await.package(package_id).cloned()
    }

    pub async fn packages(&self) -> Vec<(PackageId, Package)> {
        let state = self.state.read().await;
        state.packages().map(|(id, p)| (id, p.clone())).collect()
    }

    pub async fn review(&self, review_id: ReviewId) -> Option<Review> {
        self.state.read().await.review(review_id).cloned()
    }

    pub async fn reviews_for_package(&self, package_id: PackageId) -> Vec<(ReviewId, Review)> {
        let state = self.state.read().await;
        state
            .reviews_for_package(package_id)
            .map(|(id, r)| (id, r.clone()))
            .collect()
    }

    pub async fn account(&self, identity: &Identity) -> AccountView {
        account_view(&*self.state.read().await, identity)
    }

    pub async fn stats(&self) -> LedgerStats {
        self.state.read().await.stats()
    }

    /// Full copy of the current state
    pub async fn snapshot(&self) -> LedgerState {
        self.state.read().await.clone()
    }
}

fn account_view(state: &LedgerState, identity: &Identity) -> AccountView {
    AccountView {
        identity: identity.clone(),
        balance: state.balance_of(identity),
        stake: state.stake_of(identity),
        status: state.reviewer_status(identity),
    }
}
