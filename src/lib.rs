//! Package Review Ledger
//!
//! Incentive ledger for package reviews: developers register packages,
//! reviewers lock stake to qualify, and accepted reviews build package
//! reputation.
//!
//! ## Module Structure
//!
//! ```text
//! src/
//! ├── lib.rs         - Crate root with re-exports
//! ├── main.rs        - Server entrypoint
//! ├── config.rs      - Configuration management
//! ├── ledger/        - Ledger state machine
//! │   ├── types.rs    - Identities, ids, packages, reviews, scores
//! │   ├── accounts.rs - Balances and locked stake
//! │   ├── state.rs    - Atomic ledger operations
//! │   ├── service.rs  - Single-writer async front
//! │   └── error.rs    - Ledger rejections
//! └── api/           - HTTP API endpoints
//!     ├── ledger.rs     - Ledger routes
//!     ├── identity.rs   - Caller identity resolution
//!     └── middleware.rs - Auth, body limits, security headers
//! ```

pub mod api;
pub mod config;
pub mod ledger;

// Re-export main types for convenience
pub use api::{build_app, HeaderIdentityProvider, IdentityProvider, LedgerApiState};
pub use config::LedgerConfig;
pub use ledger::{
    AccountBook, AccountView, Identity, LedgerError, LedgerService, LedgerState, LedgerStats,
    Package, PackageId, Review, ReviewId, ReviewParams, ReviewerStatus, Score, MAX_SCORE,
    MIN_REVIEW_STAKE,
};
