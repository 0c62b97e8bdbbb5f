//! Caller Identity Resolution
//!
//! The ledger trusts whatever identity the provider hands it. Authentication
//! happens upstream (gateway, wallet session); this layer only reads the
//! result off the request.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, StatusCode},
};
use std::sync::Arc;
use tracing::debug;

use super::middleware::sanitize_for_log;
use crate::ledger::Identity;

/// Supplies the pre-authenticated caller of a request
pub trait IdentityProvider: Send + Sync {
    fn resolve(&self, headers: &HeaderMap) -> Option<Identity>;
}

/// Reads the caller from a single request header
#[derive(Debug, Clone)]
pub struct HeaderIdentityProvider {
    header: String,
}

impl HeaderIdentityProvider {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }
}

impl IdentityProvider for HeaderIdentityProvider {
    fn resolve(&self, headers: &HeaderMap) -> Option<Identity> {
        let value = headers.get(self.header.as_str())?.to_str().ok()?.trim();
        if value.is_empty() {
            return None;
        }
        Some(Identity::new(value))
    }
}

/// States that can resolve a caller
pub trait HasIdentityProvider {
    fn identity_provider(&self) -> &Arc<dyn IdentityProvider>;

    fn sanitize_logs(&self) -> bool {
        true
    }
}

/// Extractor for the authenticated caller; rejects with 401 when absent
#[derive(Debug, Clone)]
pub struct Caller(pub Identity);

impl<S> FromRequestParts<S> for Caller
where
    S: HasIdentityProvider + Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match state.identity_provider().resolve(&parts.headers) {
            Some(identity) => {
                if state.sanitize_logs() {
                    debug!(caller = %sanitize_for_log(identity.as_str()), "Caller resolved");
                } else {
                    debug!(caller = %identity, "Caller resolved");
                }
                Ok(Caller(identity))
            }
            None => {
                debug!(path = %parts.uri.path(), "Request without caller identity");
                Err((
                    StatusCode::UNAUTHORIZED,
                    "Missing caller identity".to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_header_identity() {
        let provider = HeaderIdentityProvider::new("x-caller-identity");
        let mut headers = HeaderMap::new();
        assert_eq!(provider.resolve(&headers), None);

        headers.insert("x-caller-identity", HeaderValue::from_static("  "));
        assert_eq!(provider.resolve(&headers), None);

        headers.insert("x-caller-identity", HeaderValue::from_static("ST1PQHQ"));
        assert_eq!(provider.resolve(&headers), Some(Identity::from("ST1PQHQ")));
    }
}
