use actix_web::{http::header, HttpRequest};
use std::sync::Arc;

use crate::core::Matcher;
use crate::error::ApiError;
use crate::models::Identity;
use crate::services::{CatalogCache, IdentityProvider, Store};

/// Application state shared across all handlers
///
/// Backends are injected; nothing here is process-global.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub identity: Arc<dyn IdentityProvider>,
    pub catalog: Arc<CatalogCache>,
    pub matcher: Matcher,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        identity: Arc<dyn IdentityProvider>,
        catalog_ttl_secs: u64,
    ) -> Self {
        Self {
            catalog: Arc::new(CatalogCache::new(store.clone(), catalog_ttl_secs)),
            store,
            identity,
            matcher: Matcher::new(),
        }
    }

    /// Resolve the caller from the `Authorization: Bearer` header
    pub async fn authenticate(&self, req: &HttpRequest) -> Result<Identity, ApiError> {
        let token = bearer_token(req).ok_or_else(|| {
            ApiError::Unauthorized("Authentication token not provided".to_string())
        })?;

        Ok(self.identity.validate(token).await?)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_token() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc.def"))
            .to_http_request();
        assert_eq!(bearer_token(&req), Some("abc.def"));

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "bearer   xyz"))
            .to_http_request();
        assert_eq!(bearer_token(&req), Some("xyz"));
    }

    #[test]
    fn test_bearer_token_missing_or_malformed() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(bearer_token(&req), None);

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwYXNz"))
            .to_http_request();
        assert_eq!(bearer_token(&req), None);

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer "))
            .to_http_request();
        assert_eq!(bearer_token(&req), None);
    }
}
