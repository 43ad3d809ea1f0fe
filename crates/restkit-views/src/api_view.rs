//! The `ApiView` trait: verb dispatch and exception normalization.
//!
//! Views implement per-verb handlers returning `Result<Value, ApiError>`.
//! [`ApiView::dispatch`] routes by HTTP method, wraps successful values in an
//! OK envelope, and converts any error into its catalog entry via
//! [`ApiView::handle_exception`]. No error escapes to the transport layer as
//! a raw failure: unmatched kinds collapse to `UNEXPECTED_ERROR` and the
//! original error is logged server-side only.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::Instrument as _;

use restkit_core::error::{ApiError, ValidationFailure};
use restkit_core::logging::request_span;
use restkit_http::{ApiRequest, ApiResponse};

use crate::middleware::ViewHandler;

/// The result of a verb handler: a JSON payload for the OK envelope, or an
/// error to be normalized.
pub type HandlerResult = Result<serde_json::Value, ApiError>;

/// The base trait for API views.
///
/// Every default verb handler fails with method-not-allowed; override the
/// verbs the endpoint supports.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use restkit_views::api_view::{ApiView, HandlerResult};
/// use restkit_http::ApiRequest;
///
/// struct PingView;
///
/// #[async_trait]
/// impl ApiView for PingView {
///     async fn get(&self, _request: ApiRequest) -> HandlerResult {
///         Ok(serde_json::json!({"pong": true}))
///     }
/// }
/// ```
#[async_trait]
pub trait ApiView: Send + Sync {
    /// Handles GET requests. Fails with method-not-allowed by default.
    async fn get(&self, request: ApiRequest) -> HandlerResult {
        let _ = request;
        Err(ApiError::MethodNotAllowed("GET".to_string()))
    }

    /// Handles POST requests. Fails with method-not-allowed by default.
    async fn post(&self, request: ApiRequest) -> HandlerResult {
        let _ = request;
        Err(ApiError::MethodNotAllowed("POST".to_string()))
    }

    /// Handles PUT requests. Fails with method-not-allowed by default.
    async fn put(&self, request: ApiRequest) -> HandlerResult {
        let _ = request;
        Err(ApiError::MethodNotAllowed("PUT".to_string()))
    }

    /// Handles PATCH requests. Fails with method-not-allowed by default.
    async fn patch(&self, request: ApiRequest) -> HandlerResult {
        let _ = request;
        Err(ApiError::MethodNotAllowed("PATCH".to_string()))
    }

    /// Handles DELETE requests. Fails with method-not-allowed by default.
    async fn delete(&self, request: ApiRequest) -> HandlerResult {
        let _ = request;
        Err(ApiError::MethodNotAllowed("DELETE".to_string()))
    }

    /// Dispatches the request to the appropriate verb handler and wraps the
    /// outcome in the uniform envelope.
    async fn dispatch(&self, request: ApiRequest) -> ApiResponse {
        let span = request_span(request.method().as_str(), request.path());
        async {
            let result = match *request.method() {
                http::Method::GET => self.get(request).await,
                http::Method::POST => self.post(request).await,
                http::Method::PUT => self.put(request).await,
                http::Method::PATCH => self.patch(request).await,
                http::Method::DELETE => self.delete(request).await,
                ref other => Err(ApiError::MethodNotAllowed(other.to_string())),
            };

            match result {
                Ok(data) => ApiResponse::ok(data),
                Err(error) => self.handle_exception(error),
            }
        }
        .instrument(span)
        .await
    }

    /// Converts an error into its response envelope.
    ///
    /// Known kinds map to their catalog entries; validation failures carry
    /// their own status (or the full field map as payload). Anything
    /// unmatched is logged and reported as `UNEXPECTED_ERROR` with no
    /// internal detail.
    fn handle_exception(&self, error: ApiError) -> ApiResponse {
        match &error {
            ApiError::MethodNotAllowed(_)
            | ApiError::Validation(_)
            | ApiError::AuthenticationFailed(_)
            | ApiError::InvalidToken(_)
            | ApiError::Serialization(_) => {}
            ApiError::ImproperlyConfigured(_) | ApiError::Unexpected(_) => {
                tracing::error!(error = %error, "unhandled error during request dispatch");
            }
        }
        ApiResponse::new(error.envelope())
    }

    /// Converts this view into a boxed async handler for the middleware
    /// pipeline.
    fn into_handler(self) -> ViewHandler
    where
        Self: Sized + 'static,
    {
        let view = Arc::new(self);
        Box::new(
            move |request: ApiRequest| -> Pin<Box<dyn Future<Output = ApiResponse> + Send>> {
                let view = view.clone();
                Box::pin(async move { view.dispatch(request).await })
            },
        )
    }
}

/// Normalizes an error outside any view, e.g. for failures raised before
/// dispatch reaches a handler.
pub fn exception_response(error: &ApiError) -> ApiResponse {
    if let ApiError::Unexpected(_) | ApiError::ImproperlyConfigured(_) = error {
        tracing::error!(error = %error, "unhandled error during request handling");
    }
    ApiResponse::new(error.envelope())
}

/// Converts a validation failure into an `ApiError` at the dispatch boundary.
///
/// Handlers use this to surface serializer outcomes:
///
/// ```
/// use restkit_core::{Status, ValidationFailure};
/// use restkit_views::api_view::validation_error;
///
/// let err = validation_error(ValidationFailure::Status(Status::AuthFailedError));
/// assert_eq!(err.status(), Status::AuthFailedError);
/// ```
pub fn validation_error(failure: ValidationFailure) -> ApiError {
    ApiError::Validation(failure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use restkit_core::status::Status;
    use serde_json::json;

    struct TestView;

    #[async_trait]
    impl ApiView for TestView {
        async fn get(&self, _request: ApiRequest) -> HandlerResult {
            Ok(json!({"verb": "get"}))
        }

        async fn post(&self, _request: ApiRequest) -> HandlerResult {
            Err(ApiError::AuthenticationFailed("no ambient user".to_string()))
        }
    }

    struct BareView;

    #[async_trait]
    impl ApiView for BareView {}

    fn request(method: http::Method) -> ApiRequest {
        ApiRequest::builder().method(method).build()
    }

    #[tokio::test]
    async fn test_dispatch_success_wraps_ok_envelope() {
        let response = TestView.dispatch(request(http::Method::GET)).await;
        assert_eq!(response.envelope().code, Status::Ok.code());
        assert_eq!(response.envelope().data, Some(json!({"verb": "get"})));
    }

    #[tokio::test]
    async fn test_dispatch_maps_auth_failure() {
        let response = TestView.dispatch(request(http::Method::POST)).await;
        assert_eq!(response.envelope().code, Status::AuthFailedError.code());
        assert!(response.envelope().data.is_none());
    }

    #[tokio::test]
    async fn test_default_handlers_are_method_not_allowed() {
        for method in [
            http::Method::GET,
            http::Method::POST,
            http::Method::PUT,
            http::Method::PATCH,
            http::Method::DELETE,
        ] {
            let response = BareView.dispatch(request(method)).await;
            assert_eq!(
                response.envelope().code,
                Status::MethodNotAllowedError.code()
            );
        }
    }

    #[tokio::test]
    async fn test_unknown_method_is_method_not_allowed() {
        let response = TestView.dispatch(request(http::Method::OPTIONS)).await;
        assert_eq!(
            response.envelope().code,
            Status::MethodNotAllowedError.code()
        );
    }

    #[tokio::test]
    async fn test_unexpected_error_has_fixed_code_and_no_detail() {
        struct FailingView;

        #[async_trait]
        impl ApiView for FailingView {
            async fn get(&self, _request: ApiRequest) -> HandlerResult {
                Err(ApiError::Unexpected("database on fire".to_string()))
            }
        }

        let response = FailingView.dispatch(request(http::Method::GET)).await;
        assert_eq!(response.envelope().code, Status::UnexpectedError.code());
        assert_eq!(response.envelope().message, Status::UnexpectedError.message());
        // Internal detail must not leak into the envelope
        assert!(!response.body().contains("database on fire"));
    }

    #[tokio::test]
    async fn test_validation_status_short_circuit() {
        struct ValidatingView;

        #[async_trait]
        impl ApiView for ValidatingView {
            async fn post(&self, _request: ApiRequest) -> HandlerResult {
                Err(validation_error(ValidationFailure::Status(
                    Status::TokenError,
                )))
            }
        }

        let response = ValidatingView.dispatch(request(http::Method::POST)).await;
        assert_eq!(response.envelope().code, Status::TokenError.code());
    }

    #[tokio::test]
    async fn test_validation_fields_carry_error_map() {
        struct ValidatingView;

        #[async_trait]
        impl ApiView for ValidatingView {
            async fn post(&self, _request: ApiRequest) -> HandlerResult {
                Err(validation_error(ValidationFailure::Fields(vec![(
                    "name".to_string(),
                    vec!["required".to_string()],
                )])))
            }
        }

        let response = ValidatingView.dispatch(request(http::Method::POST)).await;
        assert_eq!(response.envelope().code, Status::ValidationError.code());
        let data = response.envelope().data.clone().unwrap();
        assert_eq!(data["name"], json!(["required"]));
    }

    #[tokio::test]
    async fn test_into_handler() {
        let handler = TestView.into_handler();
        let response = handler(request(http::Method::GET)).await;
        assert!(response.envelope().is_ok());
    }

    #[test]
    fn test_exception_response() {
        let response = exception_response(&ApiError::InvalidToken("bad".to_string()));
        assert_eq!(response.envelope().code, Status::TokenError.code());
    }
}
