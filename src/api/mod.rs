//! HTTP API for the review ledger
//!
//! Provides:
//! - Ledger API (packages, stakes, reviews, account and stats reads)
//! - Caller identity resolution
//! - Security middleware (auth, body limits, headers)

pub mod identity;
pub mod ledger;
pub mod middleware;

use axum::{extract::DefaultBodyLimit, middleware as axum_middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use identity::{Caller, HeaderIdentityProvider, IdentityProvider};
pub use ledger::{create_ledger_router, LedgerApiState};
pub use middleware::{
    auth_middleware, body_size_middleware, sanitize_for_log, security_headers_middleware,
    SecurityMiddlewareConfig, SecurityState,
};

use crate::config::LedgerConfig;
use crate::ledger::LedgerService;

/// Assemble the full application: ledger routes under /ledger, a health
/// check, and the security layers
pub fn build_app(service: LedgerService, config: &LedgerConfig) -> Router {
    let identity_provider: Arc<dyn IdentityProvider> = Arc::new(HeaderIdentityProvider::new(
        config.security.identity_header.clone(),
    ));

    let security_state = SecurityState::new(SecurityMiddlewareConfig {
        enable_auth: config.security.enable_auth,
        api_keys: config.security.api_keys.clone(),
        max_request_size: config.security.max_request_size,
        public_paths: vec!["/health".to_string()],
    });

    Router::new()
        .nest(
            "/ledger",
            create_ledger_router(
                LedgerApiState::new(service, identity_provider)
                    .with_sanitize_logs(config.logging.sanitize_logs),
            ),
        )
        .route("/health", get(|| async { "OK" }))
        // Caps bodies with no declared length; the middleware below only sees headers
        .layer(DefaultBodyLimit::max(config.security.max_request_size))
        .layer(axum_middleware::from_fn_with_state(
            security_state.clone(),
            body_size_middleware,
        ))
        .layer(axum_middleware::from_fn_with_state(
            security_state,
            auth_middleware,
        ))
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
}
