//! Package Review Ledger
//!
//! Developers register packages, reviewers lock stake to qualify, and each
//! accepted review adds its score to the package's reputation.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐     ┌─────────────────┐
//! │ LedgerService   │────►│ LedgerState      │────►│ AccountBook     │
//! │ (single writer) │     │ (packages,       │     │ (balances,      │
//! └─────────────────┘     │  reviews)        │     │  stakes)        │
//!                         └──────────────────┘     └─────────────────┘
//! ```
//!
//! ## Rules
//!
//! - Package and review ids are `count + 1`, starting at 1
//! - Staking moves funds from the caller into the ledger-owned account
//! - Reviews need at least `min_review_stake` (default 100) locked
//! - Scores are 0..=5; stake is checked before score
//! - Stake gates reviews but is never spent, and there is no unstaking

mod accounts;
mod error;
mod service;
mod state;
mod types;

pub use accounts::AccountBook;
pub use error::LedgerError;
pub use service::{AccountView, LedgerService};
pub use state::{LedgerState, LedgerStats};
pub use types::{
    Identity, Package, PackageId, Review, ReviewId, ReviewParams, ReviewerStatus, Score,
    MAX_SCORE, MIN_REVIEW_STAKE,
};
