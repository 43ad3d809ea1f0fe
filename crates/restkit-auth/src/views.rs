//! Token endpoint views.
//!
//! Three POST-only endpoints complete the token lifecycle:
//!
//! - [`TokenObtainPairView`]: authenticates the request from ambient state
//!   and issues a refresh/access pair.
//! - [`TokenRefreshView`]: exchanges a refresh token for a fresh access
//!   token.
//! - [`TokenVerifyView`]: checks a token's signature and expiry without
//!   issuing anything.
//!
//! All three answer through the uniform envelope; failures surface as
//! catalog entries via the exception normalizer.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

use restkit_core::error::ApiError;
use restkit_http::ApiRequest;
use restkit_serializers::{FieldDef, FieldType, Serializer};
use restkit_views::api_view::{ApiView, HandlerResult};

use crate::store::UserStore;
use crate::tokens::{self, TokenConfig};

/// Issues a refresh/access token pair for an ambiently-authenticated
/// request.
///
/// The request body carries no credentials; identity comes from the store's
/// ambient authentication (e.g. `REMOTE_USER`). An unauthenticated request
/// fails with the auth-failed catalog entry.
pub struct TokenObtainPairView {
    store: Arc<dyn UserStore>,
    config: TokenConfig,
    update_last_login: bool,
}

impl TokenObtainPairView {
    /// Creates the view over a user store.
    pub fn new(store: Arc<dyn UserStore>, config: TokenConfig) -> Self {
        Self {
            store,
            config,
            update_last_login: false,
        }
    }

    /// Records the login timestamp whenever a pair is issued.
    #[must_use]
    pub const fn with_update_last_login(mut self, enabled: bool) -> Self {
        self.update_last_login = enabled;
        self
    }
}

#[async_trait]
impl ApiView for TokenObtainPairView {
    async fn post(&self, request: ApiRequest) -> HandlerResult {
        let user = self
            .store
            .authenticate_request(&request)
            .await?
            .ok_or_else(|| {
                ApiError::AuthenticationFailed("Request carries no authenticated user".to_string())
            })?;

        let pair = tokens::issue_pair(user.id, &self.config);

        if self.update_last_login {
            self.store.update_last_login(user.id, Utc::now()).await?;
        }

        tracing::info!(user_id = user.id, "issued token pair");
        Ok(json!({"refresh": pair.refresh, "access": pair.access}))
    }
}

/// Exchanges a refresh token for a fresh access token.
pub struct TokenRefreshView {
    config: TokenConfig,
    serializer: Serializer,
}

impl TokenRefreshView {
    /// Creates the view.
    pub fn new(config: TokenConfig) -> Self {
        Self {
            config,
            serializer: Serializer::new().field(FieldDef::new("refresh", FieldType::char())),
        }
    }
}

#[async_trait]
impl ApiView for TokenRefreshView {
    async fn post(&self, request: ApiRequest) -> HandlerResult {
        let payload = request.json_value()?;
        let validated = self.serializer.validate(&payload)?;
        let refresh = validated
            .get("refresh")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let access = tokens::refresh_access(refresh, &self.config)?;
        Ok(json!({"access": access}))
    }
}

/// Checks a token's validity without issuing anything.
///
/// Accepts both token types; a valid token answers with an empty OK
/// envelope (`data: null`).
pub struct TokenVerifyView {
    config: TokenConfig,
    serializer: Serializer,
}

impl TokenVerifyView {
    /// Creates the view.
    pub fn new(config: TokenConfig) -> Self {
        Self {
            config,
            serializer: Serializer::new().field(FieldDef::new("token", FieldType::char())),
        }
    }
}

#[async_trait]
impl ApiView for TokenVerifyView {
    async fn post(&self, request: ApiRequest) -> HandlerResult {
        let payload = request.json_value()?;
        let validated = self.serializer.validate(&payload)?;
        let token = validated
            .get("token")
            .and_then(Value::as_str)
            .unwrap_or_default();

        tokens::decode(token, &self.config, None)?;
        Ok(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{AuthUser, MemoryUserStore};
    use crate::tokens::{issue_pair, ACCESS_TOKEN_TYPE, REFRESH_TOKEN_TYPE};
    use restkit_core::status::Status;

    fn config() -> TokenConfig {
        TokenConfig::new("test-secret")
    }

    fn store() -> Arc<MemoryUserStore> {
        Arc::new(MemoryUserStore::with_users(vec![AuthUser::new(
            1,
            "alice",
            "alice@example.com",
        )]))
    }

    fn authenticated_post() -> ApiRequest {
        ApiRequest::builder()
            .method(http::Method::POST)
            .path("/api/token/")
            .meta("REMOTE_USER", "alice")
            .build()
    }

    #[tokio::test]
    async fn test_obtain_pair() {
        let cfg = config();
        let view = TokenObtainPairView::new(store(), cfg.clone());

        let response = view.dispatch(authenticated_post()).await;
        assert!(response.envelope().is_ok());

        let data = response.envelope().data.clone().unwrap();
        let access = data["access"].as_str().unwrap();
        let refresh = data["refresh"].as_str().unwrap();
        assert!(tokens::decode(access, &cfg, Some(ACCESS_TOKEN_TYPE)).is_ok());
        assert!(tokens::decode(refresh, &cfg, Some(REFRESH_TOKEN_TYPE)).is_ok());
    }

    #[tokio::test]
    async fn test_obtain_pair_unauthenticated() {
        let view = TokenObtainPairView::new(store(), config());
        let request = ApiRequest::builder()
            .method(http::Method::POST)
            .path("/api/token/")
            .build();

        let response = view.dispatch(request).await;
        assert_eq!(response.envelope().code, Status::AuthFailedError.code());
    }

    #[tokio::test]
    async fn test_obtain_pair_records_last_login() {
        let users = store();
        let view = TokenObtainPairView::new(users.clone(), config()).with_update_last_login(true);

        view.dispatch(authenticated_post()).await;

        let user = users.get_by_id(1).await.unwrap().unwrap();
        assert!(user.last_login.is_some());
    }

    #[tokio::test]
    async fn test_obtain_pair_get_not_allowed() {
        let view = TokenObtainPairView::new(store(), config());
        let request = ApiRequest::builder().method(http::Method::GET).build();
        let response = view.dispatch(request).await;
        assert_eq!(
            response.envelope().code,
            Status::MethodNotAllowedError.code()
        );
    }

    #[tokio::test]
    async fn test_refresh() {
        let cfg = config();
        let pair = issue_pair(1, &cfg);
        let view = TokenRefreshView::new(cfg.clone());

        let request = ApiRequest::builder()
            .method(http::Method::POST)
            .json(&json!({"refresh": pair.refresh}))
            .build();
        let response = view.dispatch(request).await;
        assert!(response.envelope().is_ok());

        let data = response.envelope().data.clone().unwrap();
        let access = data["access"].as_str().unwrap();
        assert!(tokens::decode(access, &cfg, Some(ACCESS_TOKEN_TYPE)).is_ok());
    }

    #[tokio::test]
    async fn test_refresh_missing_field_is_validation_error() {
        let view = TokenRefreshView::new(config());
        let request = ApiRequest::builder()
            .method(http::Method::POST)
            .json(&json!({}))
            .build();
        let response = view.dispatch(request).await;
        assert_eq!(response.envelope().code, Status::ValidationError.code());
        let data = response.envelope().data.clone().unwrap();
        assert_eq!(data["refresh"], json!(["required"]));
    }

    #[tokio::test]
    async fn test_refresh_with_access_token_is_token_error() {
        let cfg = config();
        let pair = issue_pair(1, &cfg);
        let view = TokenRefreshView::new(cfg);

        let request = ApiRequest::builder()
            .method(http::Method::POST)
            .json(&json!({"refresh": pair.access}))
            .build();
        let response = view.dispatch(request).await;
        assert_eq!(response.envelope().code, Status::TokenError.code());
    }

    #[tokio::test]
    async fn test_verify_accepts_both_types() {
        let cfg = config();
        let pair = issue_pair(1, &cfg);
        let view = TokenVerifyView::new(cfg);

        for token in [&pair.access, &pair.refresh] {
            let request = ApiRequest::builder()
                .method(http::Method::POST)
                .json(&json!({"token": token}))
                .build();
            let response = view.dispatch(request).await;
            assert!(response.envelope().is_ok());
            assert_eq!(response.envelope().data, Some(Value::Null));
        }
    }

    #[tokio::test]
    async fn test_verify_invalid_token() {
        let view = TokenVerifyView::new(config());
        let request = ApiRequest::builder()
            .method(http::Method::POST)
            .json(&json!({"token": "not-a-token"}))
            .build();
        let response = view.dispatch(request).await;
        assert_eq!(response.envelope().code, Status::TokenError.code());
    }

    #[tokio::test]
    async fn test_verify_malformed_body() {
        let view = TokenVerifyView::new(config());
        let request = ApiRequest::builder()
            .method(http::Method::POST)
            .body(b"not json".to_vec())
            .build();
        let response = view.dispatch(request).await;
        assert_eq!(response.envelope().code, Status::ValidationError.code());
    }
}
