//! Ledger API Endpoints
//!
//! Mutating routes take the caller from the identity provider; reads are
//! open to anyone.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::identity::{Caller, HasIdentityProvider, IdentityProvider};
use crate::ledger::{
    AccountView, Identity, LedgerError, LedgerService, LedgerStats, Package, PackageId, Review,
    ReviewId,
};

/// API state for ledger endpoints
#[derive(Clone)]
pub struct LedgerApiState {
    pub service: LedgerService,
    pub identity_provider: Arc<dyn IdentityProvider>,
    /// Mask caller identities in logs
    pub sanitize_logs: bool,
}

impl LedgerApiState {
    pub fn new(service: LedgerService, identity_provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            service,
            identity_provider,
            sanitize_logs: true,
        }
    }

    pub fn with_sanitize_logs(mut self, sanitize_logs: bool) -> Self {
        self.sanitize_logs = sanitize_logs;
        self
    }
}

impl HasIdentityProvider for LedgerApiState {
    fn identity_provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.identity_provider
    }

    fn sanitize_logs(&self) -> bool {
        self.sanitize_logs
    }
}

// Request types

#[derive(Debug, Deserialize)]
pub struct SubmitPackageRequest {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Deserialize)]
pub struct StakeRequest {
    pub amount: u64,
}

#[derive(Debug, Deserialize)]
pub struct SubmitReviewRequest {
    pub package_id: u64,
    pub score: i64,
    #[serde(default)]
    pub comment: String,
}

// Response types

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitPackageResponse {
    pub package_id: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StakeResponse {
    pub success: bool,
    pub stake: u64,
    pub balance: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitReviewResponse {
    pub success: bool,
    pub review_id: u64,
}

#[derive(Debug, Serialize)]
pub struct PackageSummary {
    pub package_id: PackageId,
    #[serde(flatten)]
    pub package: Package,
}

#[derive(Debug, Serialize)]
pub struct ReviewSummary {
    pub review_id: ReviewId,
    #[serde(flatten)]
    pub review: Review,
}

#[derive(Debug, Serialize)]
pub struct PackageDetailResponse {
    pub package_id: PackageId,
    #[serde(flatten)]
    pub package: Package,
    pub reviews: Vec<ReviewSummary>,
}

/// Map a ledger rejection to an HTTP status; the body keeps the message
pub fn ledger_error_response(err: LedgerError) -> (StatusCode, String) {
    let status = match err {
        LedgerError::InsufficientBalance { .. } | LedgerError::InsufficientStake { .. } => {
            StatusCode::CONFLICT
        }
        LedgerError::InvalidScore(_) => StatusCode::UNPROCESSABLE_ENTITY,
        LedgerError::BalanceOverflow { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

// Endpoints

/// POST /ledger/packages - Register a package
pub async fn submit_package(
    State(state): State<LedgerApiState>,
    Caller(caller): Caller,
    Json(payload): Json<SubmitPackageRequest>,
) -> (StatusCode, Json<SubmitPackageResponse>) {
    let package_id = state
        .service
        .submit_package(&caller, &payload.name, &payload.version)
        .await;

    (
        StatusCode::CREATED,
        Json(SubmitPackageResponse {
            package_id: package_id.0,
        }),
    )
}

/// POST /ledger/stakes - Lock balance as review stake
pub async fn stake_for_review(
    State(state): State<LedgerApiState>,
    Caller(caller): Caller,
    Json(payload): Json<StakeRequest>,
) -> Result<Json<StakeResponse>, (StatusCode, String)> {
    let account = state
        .service
        .stake_for_review(&caller, payload.amount)
        .await
        .map_err(ledger_error_response)?;

    Ok(Json(StakeResponse {
        success: true,
        stake: account.stake,
        balance: account.balance,
    }))
}

/// POST /ledger/reviews - Review a package
pub async fn submit_review(
    State(state): State<LedgerApiState>,
    Caller(caller): Caller,
    Json(payload): Json<SubmitReviewRequest>,
) -> Result<(StatusCode, Json<SubmitReviewResponse>), (StatusCode, String)> {
    let review_id = state
        .service
        .submit_review(
            &caller,
            PackageId(payload.package_id),
            payload.score,
            &payload.comment,
        )
        .await
        .map_err(ledger_error_response)?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitReviewResponse {
            success: true,
            review_id: review_id.0,
        }),
    ))
}

/// GET /ledger/packages - List packages in id order
pub async fn list_packages(State(state): State<LedgerApiState>) -> Json<Vec<PackageSummary>> {
    let packages = state
        .service
        .packages()
        .await
        .into_iter()
        .map(|(package_id, package)| PackageSummary {
            package_id,
            package,
        })
        .collect();

    Json(packages)
}

/// GET /ledger/packages/{package_id} - Package with its reviews
pub async fn get_package(
    State(state): State<LedgerApiState>,
    Path(package_id): Path<u64>,
) -> Result<Json<PackageDetailResponse>, (StatusCode, String)> {
    let package_id = PackageId(package_id);
    let package = state
        .service
        .package(package_id)
        .await
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Package {} not found", package_id)))?;

    let reviews = state
        .service
        .reviews_for_package(package_id)
        .await
        .into_iter()
        .map(|(review_id, review)| ReviewSummary { review_id, review })
        .collect();

    Ok(Json(PackageDetailResponse {
        package_id,
        package,
        reviews,
    }))
}

/// GET /ledger/reviews/{review_id}
pub async fn get_review(
    State(state): State<LedgerApiState>,
    Path(review_id): Path<u64>,
) -> Result<Json<ReviewSummary>, (StatusCode, String)> {
    let review_id = ReviewId(review_id);
    let review = state
        .service
        .review(review_id)
        .await
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Review {} not found", review_id)))?;

    Ok(Json(ReviewSummary { review_id, review }))
}

/// GET /ledger/accounts/{identity} - Balance, stake and reviewer status
pub async fn get_account(
    State(state): State<LedgerApiState>,
    Path(identity): Path<String>,
) -> Json<AccountView> {
    Json(state.service.account(&Identity::new(identity)).await)
}

/// GET /ledger/stats
pub async fn get_stats(State(state): State<LedgerApiState>) -> Json<LedgerStats> {
    Json(state.service.stats().await)
}

/// Create the ledger API router
pub fn create_ledger_router(state: LedgerApiState) -> Router {
    Router::new()
        .route("/packages", get(list_packages).post(submit_package))
        .route("/packages/{package_id}", get(get_package))
        .route("/stakes", post(stake_for_review))
        .route("/reviews", post(submit_review))
        .route("/reviews/{review_id}", get(get_review))
        .route("/accounts/{identity}", get(get_account))
        .route("/stats", get(get_stats))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let (status, body) = ledger_error_response(LedgerError::InvalidScore(9));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("Invalid score"));

        let (status, _) = ledger_error_response(LedgerError::InsufficientBalance {
            identity: "a".into(),
            requested: 5,
            available: 1,
        });
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
