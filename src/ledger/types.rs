//! Ledger Record Types and Review Parameters
//!
//! Packages and reviews are write-once records keyed by dense ids.
//! Only a package's reputation changes after insertion.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::LedgerError;

/// Stake an identity must hold before it may submit a review
pub const MIN_REVIEW_STAKE: u64 = 100;

/// Highest score a review may carry (lowest is 0)
pub const MAX_SCORE: u8 = 5;

/// Opaque caller identity, pre-authenticated by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Package identifier, assigned as `package_count + 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageId(pub u64);

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Review identifier, numbered independently of packages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(pub u64);

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A review score in `0..=MAX_SCORE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
    /// Validate a raw score
    pub fn new(raw: i64) -> Result<Self, LedgerError> {
        if (0..=i64::from(MAX_SCORE)).contains(&raw) {
            Ok(Self(raw as u8))
        } else {
            Err(LedgerError::InvalidScore(raw))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

/// A registered software package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub developer: Identity,
    pub name: String,
    pub version: String,

    /// Sum of the scores of every accepted review of this package
    pub reputation: u64,
}

impl Package {
    pub fn new(developer: Identity, name: String, version: String) -> Self {
        Self {
            developer,
            name,
            version,
            reputation: 0,
        }
    }
}

/// An accepted review. The package it references may not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub package_id: PackageId,
    pub reviewer: Identity,
    pub score: Score,
    pub comment: String,
}

/// Governance-configurable review parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewParams {
    /// Minimum accumulated stake to qualify as a reviewer
    pub min_review_stake: u64,
}

impl Default for ReviewParams {
    fn default() -> Self {
        Self {
            min_review_stake: MIN_REVIEW_STAKE,
        }
    }
}

/// Reviewer qualification derived from accumulated stake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewerStatus {
    /// Stake below the minimum; reviews are rejected
    Unqualified,
    /// Stake at or above the minimum
    Qualified,
}

impl ReviewerStatus {
    pub fn from_stake(stake: u64, params: &ReviewParams) -> Self {
        if stake >= params.min_review_stake {
            ReviewerStatus::Qualified
        } else {
            ReviewerStatus::Unqualified
        }
    }

    pub fn can_review(&self) -> bool {
        matches!(self, ReviewerStatus::Qualified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bounds() {
        for raw in 0..=5 {
            assert_eq!(Score::new(raw).unwrap().value() as i64, raw);
        }
        assert_eq!(Score::new(6), Err(LedgerError::InvalidScore(6)));
        assert_eq!(Score::new(-1), Err(LedgerError::InvalidScore(-1)));
        assert_eq!(
            Score::new(i64::MIN),
            Err(LedgerError::InvalidScore(i64::MIN))
        );
    }

    #[test]
    fn test_new_package_has_zero_reputation() {
        let package = Package::new("dev".into(), "left-pad".to_string(), "1.0.0".to_string());
        assert_eq!(package.reputation, 0);
        assert_eq!(package.developer.as_str(), "dev");
    }

    #[test]
    fn test_reviewer_status_threshold() {
        let params = ReviewParams::default();
        assert_eq!(ReviewerStatus::from_stake(0, &params), ReviewerStatus::Unqualified);
        assert_eq!(ReviewerStatus::from_stake(99, &params), ReviewerStatus::Unqualified);
        assert_eq!(ReviewerStatus::from_stake(100, &params), ReviewerStatus::Qualified);
        assert!(ReviewerStatus::Qualified.can_review());
        assert!(!ReviewerStatus::Unqualified.can_review());
    }

    #[test]
    fn test_ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&PackageId(7)).unwrap();
        assert_eq!(json, "7");
        let identity: Identity = serde_json::from_str("\"ST1ABC\"").unwrap();
        assert_eq!(identity, Identity::from("ST1ABC"));
    }
}
