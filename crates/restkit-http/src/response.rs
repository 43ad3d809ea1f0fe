//! HTTP response type.
//!
//! [`ApiResponse`] is an envelope-backed JSON response. The application-level
//! status lives in the envelope's `code`; the HTTP status is 200 unless a
//! middleware refuses the request at the transport level (e.g. CSRF → 403).

use axum::response::IntoResponse;
use http::{HeaderMap, HeaderValue, StatusCode};

use restkit_core::envelope::Envelope;
use restkit_core::status::Status;

/// An outgoing API response wrapping a response [`Envelope`].
///
/// # Examples
///
/// ```
/// use restkit_http::ApiResponse;
/// use restkit_core::status::Status;
///
/// let response = ApiResponse::ok(serde_json::json!({"access": "..."}));
/// assert_eq!(response.http_status(), http::StatusCode::OK);
/// assert_eq!(response.envelope().code, 20000);
///
/// let refused = ApiResponse::from_status(Status::CsrfFailedError)
///     .with_http_status(http::StatusCode::FORBIDDEN);
/// assert_eq!(refused.http_status(), http::StatusCode::FORBIDDEN);
/// ```
#[derive(Debug, Clone)]
pub struct ApiResponse {
    http_status: StatusCode,
    headers: HeaderMap,
    envelope: Envelope,
}

impl ApiResponse {
    /// Creates a response from an envelope, with HTTP 200.
    pub fn new(envelope: Envelope) -> Self {
        Self {
            http_status: StatusCode::OK,
            headers: HeaderMap::new(),
            envelope,
        }
    }

    /// Creates an OK response carrying the given payload.
    pub fn ok(data: serde_json::Value) -> Self {
        Self::new(Envelope::ok(data))
    }

    /// Creates a response from a catalog entry with no payload.
    pub fn from_status(status: Status) -> Self {
        Self::new(Envelope::from_status(status))
    }

    /// Overrides the HTTP status code.
    #[must_use]
    pub fn with_http_status(mut self, status: StatusCode) -> Self {
        self.http_status = status;
        self
    }

    /// Adds a header to the response.
    #[must_use]
    pub fn with_header(mut self, name: http::header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Returns the HTTP status code.
    pub const fn http_status(&self) -> StatusCode {
        self.http_status
    }

    /// Returns the response headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a mutable reference to the headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns the response envelope.
    pub const fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Serializes the envelope to its JSON body.
    pub fn body(&self) -> String {
        serde_json::to_string(&self.envelope).unwrap_or_else(|_| {
            // Envelope serialization cannot fail for catalog-backed values;
            // fall back to a minimal unexpected-error body if it ever does.
            format!(
                "{{\"code\":{},\"message\":\"{}\"}}",
                Status::UnexpectedError.code(),
                Status::UnexpectedError.message()
            )
        })
    }
}

impl From<Envelope> for ApiResponse {
    fn from(envelope: Envelope) -> Self {
        Self::new(envelope)
    }
}

impl From<Status> for ApiResponse {
    fn from(status: Status) -> Self {
        Self::from_status(status)
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> axum::response::Response {
        let body = self.body();
        let mut builder = axum::response::Response::builder()
            .status(self.http_status)
            .header(
                http::header::CONTENT_TYPE,
                HeaderValue::from_static("application/json; charset=utf-8"),
            );

        if let Some(headers) = builder.headers_mut() {
            for (key, value) in &self.headers {
                headers.insert(key, value.clone());
            }
        }

        builder
            .body(axum::body::Body::from(body))
            .unwrap_or_else(|_| {
                axum::response::Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .body(axum::body::Body::empty())
                    .expect("fallback response should always be valid")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_response() {
        let response = ApiResponse::ok(json!({"id": 7}));
        assert_eq!(response.http_status(), StatusCode::OK);
        assert!(response.envelope().is_ok());
        assert_eq!(response.envelope().data, Some(json!({"id": 7})));
    }

    #[test]
    fn test_from_status() {
        let response = ApiResponse::from_status(Status::TokenError);
        assert_eq!(response.http_status(), StatusCode::OK);
        assert_eq!(response.envelope().code, 40003);
    }

    #[test]
    fn test_http_status_override() {
        let response =
            ApiResponse::from_status(Status::CsrfFailedError).with_http_status(StatusCode::FORBIDDEN);
        assert_eq!(response.http_status(), StatusCode::FORBIDDEN);
        // Envelope code is untouched by the transport status
        assert_eq!(response.envelope().code, 50001);
    }

    #[test]
    fn test_body_serialization() {
        let response = ApiResponse::from_status(Status::MethodNotAllowedError);
        let body: serde_json::Value = serde_json::from_str(&response.body()).unwrap();
        assert_eq!(body["code"], 40000);
        assert_eq!(body["message"], "Request method not allowed");
        assert!(body.get("data").is_none());
    }

    #[test]
    fn test_with_header() {
        let response = ApiResponse::from_status(Status::Ok).with_header(
            http::header::SET_COOKIE,
            HeaderValue::from_static("csrftoken=abc"),
        );
        assert_eq!(
            response.headers().get(http::header::SET_COOKIE).unwrap(),
            "csrftoken=abc"
        );
    }

    #[test]
    fn test_from_impls() {
        let response: ApiResponse = Status::Ok.into();
        assert!(response.envelope().is_ok());

        let response: ApiResponse = Envelope::ok(json!(null)).into();
        assert_eq!(response.envelope().data, Some(serde_json::Value::Null));
    }

    #[tokio::test]
    async fn test_into_axum_response() {
        let response = ApiResponse::ok(json!({"x": 1})).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(http::header::CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap(),
            "application/json; charset=utf-8"
        );
    }
}
