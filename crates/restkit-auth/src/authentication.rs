//! Request authentication from bearer tokens.
//!
//! [`TokenAuthentication`] extracts and verifies the `Authorization: Bearer`
//! header, producing a [`TokenPrincipal`]: the verified claim set plus the
//! user identifier it names. The principal resolves to a concrete user
//! through a [`UserStore`] lookup by identifier.

use serde_json::{Map, Value};

use restkit_core::error::{ApiError, ApiResult};
use restkit_http::ApiRequest;

use crate::store::{AuthUser, UserStore};
use crate::tokens::{self, TokenConfig, ACCESS_TOKEN_TYPE};

/// The identity carried by a verified token.
///
/// Holds the full claim set; the user identifier is extracted eagerly so a
/// token missing the configured claim is rejected at verification time, not
/// at first use.
#[derive(Debug, Clone)]
pub struct TokenPrincipal {
    claims: Map<String, Value>,
    user_id: i64,
}

impl TokenPrincipal {
    /// Builds a principal from a verified claim set.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidToken`] when the configured user-identifier
    /// claim is absent or not an integer.
    pub fn from_claims(claims: Map<String, Value>, user_id_claim: &str) -> ApiResult<Self> {
        let user_id = claims
            .get(user_id_claim)
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                ApiError::InvalidToken(format!("Token has no {user_id_claim} claim"))
            })?;
        Ok(Self { claims, user_id })
    }

    /// Returns the user identifier named by the token.
    pub const fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Returns a claim by name.
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// Resolves the principal to its user record.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::AuthenticationFailed`] when the identifier matches
    /// no user or the user is inactive.
    pub async fn to_user(&self, store: &dyn UserStore) -> ApiResult<AuthUser> {
        let user = store
            .get_by_id(self.user_id)
            .await?
            .ok_or_else(|| ApiError::AuthenticationFailed("User not found".to_string()))?;
        if !user.is_active {
            return Err(ApiError::AuthenticationFailed("User is inactive".to_string()));
        }
        Ok(user)
    }
}

/// Bearer-token authentication for incoming requests.
#[derive(Debug, Clone)]
pub struct TokenAuthentication {
    config: TokenConfig,
}

impl TokenAuthentication {
    /// Creates an authenticator with the given token config.
    pub const fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    /// Authenticates a request from its `Authorization` header.
    ///
    /// Returns `Ok(None)` when the header is absent or not a bearer scheme,
    /// so other authentication mechanisms may still run.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidToken`] when a bearer token is present but
    /// does not verify as an access token.
    pub fn authenticate(&self, request: &ApiRequest) -> ApiResult<Option<TokenPrincipal>> {
        let Some(header) = request
            .headers()
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
        else {
            return Ok(None);
        };

        let Some(token) = header.strip_prefix("Bearer ") else {
            return Ok(None);
        };

        let claims = tokens::decode(token, &self.config, Some(ACCESS_TOKEN_TYPE))?;
        let principal = TokenPrincipal::from_claims(claims, &self.config.user_id_claim)?;
        Ok(Some(principal))
    }
}
