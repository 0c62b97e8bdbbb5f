//! Ledger errors. Every variant is raised before any state is touched.

use thiserror::Error;

use super::types::Identity;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Insufficient balance: {identity} requested {requested}, has {available}")]
    InsufficientBalance {
        identity: Identity,
        requested: u64,
        available: u64,
    },

    #[error("Insufficient stake: {identity} has {staked}, reviews require {required}")]
    InsufficientStake {
        identity: Identity,
        required: u64,
        staked: u64,
    },

    #[error("Invalid score: {0} (must be between 0 and 5)")]
    InvalidScore(i64),

    #[error("Balance overflow for {identity}")]
    BalanceOverflow { identity: Identity },
}

impl LedgerError {
    /// Short machine-readable kind, stable across message changes
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::InsufficientBalance { .. } => "insufficient_balance",
            LedgerError::InsufficientStake { .. } => "insufficient_stake",
            LedgerError::InvalidScore(_) => "invalid_score",
            LedgerError::BalanceOverflow { .. } => "balance_overflow",
        }
    }
}
