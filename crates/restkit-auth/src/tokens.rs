//! Signed token pairs.
//!
//! Tokens are compact HS256 JWTs: a base64url-encoded header and claim set,
//! signed with HMAC-SHA256 under the configured secret. Two token types
//! exist: short-lived `access` tokens presented on authenticated requests,
//! and longer-lived `refresh` tokens exchanged for fresh access tokens.
//!
//! Every token carries the configured user-identifier claim, an expiry
//! (`exp`), an issued-at (`iat`), a unique `jti`, and its `token_type`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde_json::{Map, Value};
use sha2::Sha256;
use uuid::Uuid;

use restkit_core::error::ApiError;
use restkit_core::settings::Settings;

type HmacSha256 = Hmac<Sha256>;

/// The claim naming the token type.
pub const TOKEN_TYPE_CLAIM: &str = "token_type";

/// The token type presented on authenticated requests.
pub const ACCESS_TOKEN_TYPE: &str = "access";

/// The token type exchanged for fresh access tokens.
pub const REFRESH_TOKEN_TYPE: &str = "refresh";

/// Snapshot of the settings the token machinery reads.
///
/// Components take a `TokenConfig` at construction instead of reading the
/// global settings on every call.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// The HMAC signing secret.
    pub secret_key: String,
    /// Access token lifetime in seconds.
    pub access_lifetime: u64,
    /// Refresh token lifetime in seconds.
    pub refresh_lifetime: u64,
    /// The claim carrying the user identifier.
    pub user_id_claim: String,
}

impl TokenConfig {
    /// Creates a config with the given secret and default lifetimes.
    pub fn new(secret_key: impl Into<String>) -> Self {
        let defaults = Settings::default();
        Self {
            secret_key: secret_key.into(),
            access_lifetime: defaults.access_token_lifetime,
            refresh_lifetime: defaults.refresh_token_lifetime,
            user_id_claim: defaults.user_id_claim,
        }
    }

    /// Snapshots the token-related settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            secret_key: settings.secret_key.clone(),
            access_lifetime: settings.access_token_lifetime,
            refresh_lifetime: settings.refresh_token_lifetime,
            user_id_claim: settings.user_id_claim.clone(),
        }
    }
}

/// A freshly-issued refresh/access token pair.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TokenPair {
    /// The refresh token.
    pub refresh: String,
    /// The access token.
    pub access: String,
}

/// Issues a refresh/access token pair for a user.
pub fn issue_pair(user_id: i64, config: &TokenConfig) -> TokenPair {
    TokenPair {
        refresh: issue(user_id, REFRESH_TOKEN_TYPE, config.refresh_lifetime, config),
        access: issue(user_id, ACCESS_TOKEN_TYPE, config.access_lifetime, config),
    }
}

/// Issues a single token of the given type and lifetime.
pub fn issue(user_id: i64, token_type: &str, lifetime_secs: u64, config: &TokenConfig) -> String {
    let now = Utc::now().timestamp();
    let lifetime = i64::try_from(lifetime_secs).unwrap_or(i64::MAX);

    let mut claims = Map::new();
    claims.insert(TOKEN_TYPE_CLAIM.to_string(), Value::from(token_type));
    claims.insert("exp".to_string(), Value::from(now.saturating_add(lifetime)));
    claims.insert("iat".to_string(), Value::from(now));
    claims.insert("jti".to_string(), Value::from(Uuid::new_v4().simple().to_string()));
    claims.insert(config.user_id_claim.clone(), Value::from(user_id));

    encode(&claims, config)
}

/// Encodes and signs a claim set as a compact token.
pub fn encode(claims: &Map<String, Value>, config: &TokenConfig) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        serde_json::to_vec(claims).unwrap_or_else(|_| b"{}".to_vec()),
    );
    let signing_input = format!("{header}.{payload}");
    let signature = make_signature(&signing_input, &config.secret_key);
    format!("{signing_input}.{signature}")
}

/// Verifies a token and returns its claim set.
///
/// Checks, in order: compact format, signature, token type (when
/// `expected_type` is given), and expiry. Every failure maps to
/// [`ApiError::InvalidToken`] so callers report the catalog's token error
/// without distinguishing the cause to the client.
///
/// # Errors
///
/// Returns [`ApiError::InvalidToken`] on any verification failure.
pub fn decode(
    token: &str,
    config: &TokenConfig,
    expected_type: Option<&str>,
) -> Result<Map<String, Value>, ApiError> {
    let mut parts = token.splitn(3, '.');
    let (Some(header), Some(payload), Some(signature)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return Err(ApiError::InvalidToken("Malformed token".to_string()));
    };

    let signing_input = format!("{header}.{payload}");
    let expected = make_signature(&signing_input, &config.secret_key);
    if !constant_time_eq(signature, &expected) {
        return Err(ApiError::InvalidToken("Signature mismatch".to_string()));
    }

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| ApiError::InvalidToken("Malformed token payload".to_string()))?;
    let claims: Map<String, Value> = serde_json::from_slice(&payload_bytes)
        .map_err(|_| ApiError::InvalidToken("Token payload is not a claim set".to_string()))?;

    if let Some(expected_type) = expected_type {
        let token_type = claims.get(TOKEN_TYPE_CLAIM).and_then(Value::as_str);
        if token_type != Some(expected_type) {
            return Err(ApiError::InvalidToken(format!(
                "Token has wrong type, expected {expected_type}"
            )));
        }
    }

    let exp = claims
        .get("exp")
        .and_then(Value::as_i64)
        .ok_or_else(|| ApiError::InvalidToken("Token has no expiry".to_string()))?;
    if exp <= Utc::now().timestamp() {
        return Err(ApiError::InvalidToken("Token has expired".to_string()));
    }

    Ok(claims)
}

/// Exchanges a refresh token for a fresh access token.
///
/// # Errors
///
/// Returns [`ApiError::InvalidToken`] if the refresh token does not verify
/// or carries no user identifier.
pub fn refresh_access(refresh_token: &str, config: &TokenConfig) -> Result<String, ApiError> {
    let claims = decode(refresh_token, config, Some(REFRESH_TOKEN_TYPE))?;
    let user_id = claims
        .get(&config.user_id_claim)
        .and_then(Value::as_i64)
        .ok_or_else(|| ApiError::InvalidToken("Token has no user identifier".to_string()))?;
    Ok(issue(user_id, ACCESS_TOKEN_TYPE, config.access_lifetime, config))
}

fn make_signature(value: &str, key: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC accepts any key size");
    mac.update(value.as_bytes());
    URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
}

pub(crate) fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
