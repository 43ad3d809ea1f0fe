//! CSRF enforcement with a configurable exemption list.
//!
//! [`CsrfMiddleware`] checks state-changing requests for a CSRF token: the
//! value of the configured header must match the configured cookie. Paths on
//! the exemption list skip the check entirely, and the `"all"` sentinel
//! disables enforcement for every path. Refusals happen at the transport
//! level: HTTP 403 with the CSRF catalog entry as the body, before any view
//! runs.
//!
//! Safe requests (GET/HEAD/OPTIONS/TRACE) are never checked; they receive
//! the CSRF cookie on the way out when the client does not have one yet.

use async_trait::async_trait;
use http::HeaderValue;
use rand::RngCore;
use std::fmt::Write as _;

use restkit_core::settings::{CsrfExemptPaths, Settings};
use restkit_core::status::Status;
use restkit_http::{ApiRequest, ApiResponse};
use restkit_views::middleware::Middleware;

use crate::tokens::constant_time_eq;

/// The length of a CSRF token in bytes (produces a 64-char hex string).
const CSRF_TOKEN_LENGTH: usize = 32;

/// Generates a new random CSRF token.
pub fn generate_csrf_token() -> String {
    let mut bytes = [0u8; CSRF_TOKEN_LENGTH];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().fold(
        String::with_capacity(CSRF_TOKEN_LENGTH * 2),
        |mut out, b| {
            let _ = write!(out, "{b:02x}");
            out
        },
    )
}

/// CSRF protection middleware with path exemptions.
///
/// # Examples
///
/// ```
/// use restkit_auth::csrf::CsrfMiddleware;
/// use restkit_core::settings::CsrfExemptPaths;
///
/// let middleware = CsrfMiddleware::new()
///     .with_exempt_paths(CsrfExemptPaths::Paths(vec!["/api/token/".to_string()]));
/// ```
#[derive(Debug, Clone)]
pub struct CsrfMiddleware {
    cookie_name: String,
    header_name: String,
    exempt_paths: CsrfExemptPaths,
}

impl Default for CsrfMiddleware {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl CsrfMiddleware {
    /// Creates a middleware with default cookie/header names and no
    /// exemptions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots the CSRF-related settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            cookie_name: settings.csrf_cookie_name.clone(),
            header_name: settings.csrf_header_name.clone(),
            exempt_paths: settings.csrf_exempt_paths.clone(),
        }
    }

    /// Replaces the exemption list.
    #[must_use]
    pub fn with_exempt_paths(mut self, exempt_paths: CsrfExemptPaths) -> Self {
        self.exempt_paths = exempt_paths;
        self
    }

    const fn is_safe_method(method: &http::Method) -> bool {
        matches!(
            *method,
            http::Method::GET | http::Method::HEAD | http::Method::OPTIONS | http::Method::TRACE
        )
    }

    fn get_csrf_cookie(&self, request: &ApiRequest) -> Option<String> {
        let cookie_header = request
            .headers()
            .get(http::header::COOKIE)
            .and_then(|v| v.to_str().ok())?;

        for cookie in cookie_header.split(';') {
            let cookie = cookie.trim();
            if let Some(value) = cookie.strip_prefix(&format!("{}=", self.cookie_name)) {
                return Some(value.to_string());
            }
        }
        None
    }

    fn get_request_token(&self, request: &ApiRequest) -> Option<String> {
        request
            .headers()
            .get(&self.header_name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    }

    fn reject(request: &ApiRequest, reason: &str) -> ApiResponse {
        tracing::warn!(path = %request.path(), reason, "CSRF check failed");
        ApiResponse::from_status(Status::CsrfFailedError)
            .with_http_status(http::StatusCode::FORBIDDEN)
    }
}

#[async_trait]
impl Middleware for CsrfMiddleware {
    async fn process_request(&self, request: &mut ApiRequest) -> Option<ApiResponse> {
        if Self::is_safe_method(request.method()) {
            return None;
        }
        if self.exempt_paths.is_exempt(request.path()) {
            return None;
        }

        let Some(cookie_token) = self.get_csrf_cookie(request) else {
            return Some(Self::reject(request, "CSRF cookie not set"));
        };
        let Some(request_token) = self.get_request_token(request) else {
            return Some(Self::reject(request, "CSRF token missing"));
        };
        if !constant_time_eq(&cookie_token, &request_token) {
            return Some(Self::reject(request, "CSRF token mismatch"));
        }
        None
    }

    async fn process_response(&self, request: &ApiRequest, response: ApiResponse) -> ApiResponse {
        if !Self::is_safe_method(request.method()) || self.get_csrf_cookie(request).is_some() {
            return response;
        }

        let cookie = format!(
            "{}={}; Path=/; SameSite=Lax",
            self.cookie_name,
            generate_csrf_token()
        );
        match HeaderValue::from_str(&cookie) {
            Ok(value) => response.with_header(http::header::SET_COOKIE, value),
            Err(_) => response,
        }
    }
}
