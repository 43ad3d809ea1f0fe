//! Middleware framework for restkit.
//!
//! Provides the [`Middleware`] trait and [`MiddlewarePipeline`] for
//! processing requests and responses around a view handler. Middleware runs
//! in order for requests and in reverse order for responses (the "onion"
//! model), and may short-circuit a request with an early response.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use restkit_core::error::ApiError;
use restkit_http::{ApiRequest, ApiResponse};

/// The type for an async view handler function used in the pipeline.
pub type ViewHandler =
    Box<dyn Fn(ApiRequest) -> Pin<Box<dyn Future<Output = ApiResponse> + Send>> + Send + Sync>;

/// A middleware component that can process requests and responses.
///
/// Each middleware can:
/// - Inspect or modify the request before it reaches the view (`process_request`)
/// - Inspect or modify the response after the view returns (`process_response`)
/// - Handle errors raised during view processing (`process_exception`)
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Processes an incoming request before it reaches the view.
    ///
    /// Return `Some(response)` to short-circuit the pipeline and skip the
    /// view; return `None` to let the request continue.
    async fn process_request(&self, request: &mut ApiRequest) -> Option<ApiResponse>;

    /// Processes the response after the view has been called.
    ///
    /// Called in reverse middleware order.
    async fn process_response(&self, request: &ApiRequest, response: ApiResponse) -> ApiResponse {
        let _ = request;
        response
    }

    /// Handles an error that occurred during view processing.
    ///
    /// Return `Some(response)` to provide a custom error response; return
    /// `None` to let the view's own normalization proceed.
    async fn process_exception(
        &self,
        request: &ApiRequest,
        error: &ApiError,
    ) -> Option<ApiResponse> {
        let _ = (request, error);
        None
    }
}

/// A pipeline of middleware components wrapped around a view handler.
///
/// # Examples
///
/// ```
/// use restkit_views::middleware::MiddlewarePipeline;
///
/// let pipeline = MiddlewarePipeline::new();
/// assert!(pipeline.is_empty());
/// ```
pub struct MiddlewarePipeline {
    middlewares: Vec<Box<dyn Middleware>>,
}

impl Default for MiddlewarePipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl MiddlewarePipeline {
    /// Creates a new empty middleware pipeline.
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    /// Adds a middleware to the end of the pipeline.
    pub fn add(&mut self, middleware: impl Middleware + 'static) {
        self.middlewares.push(Box::new(middleware));
    }

    /// Returns the number of middleware components in the pipeline.
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Returns `true` if the pipeline has no middleware components.
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Processes a request through the full pipeline and view handler.
    ///
    /// 1. Calls `process_request` on each middleware in order. If any returns
    ///    `Some(response)`, short-circuits and runs `process_response` in
    ///    reverse on only the middleware that already ran.
    /// 2. Calls the view handler.
    /// 3. Calls `process_response` on each middleware in reverse order.
    pub async fn process(&self, mut request: ApiRequest, handler: &ViewHandler) -> ApiResponse {
        for (i, mw) in self.middlewares.iter().enumerate() {
            if let Some(response) = mw.process_request(&mut request).await {
                let mut resp = response;
                for j in (0..=i).rev() {
                    resp = self.middlewares[j].process_response(&request, resp).await;
                }
                return resp;
            }
        }

        let response = handler(request.clone()).await;

        let mut resp = response;
        for mw in self.middlewares.iter().rev() {
            resp = mw.process_response(&request, resp).await;
        }
        resp
    }
}

impl std::fmt::Debug for MiddlewarePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewarePipeline")
            .field("middleware_count", &self.middlewares.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restkit_core::status::Status;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct Passthrough;

    #[async_trait]
    impl Middleware for Passthrough {
        async fn process_request(&self, _request: &mut ApiRequest) -> Option<ApiResponse> {
            None
        }
    }

    struct ShortCircuit;

    #[async_trait]
    impl Middleware for ShortCircuit {
        async fn process_request(&self, _request: &mut ApiRequest) -> Option<ApiResponse> {
            Some(
                ApiResponse::from_status(Status::CsrfFailedError)
                    .with_http_status(http::StatusCode::FORBIDDEN),
            )
        }
    }

    struct OrderTracker {
        name: &'static str,
        counter: Arc<AtomicUsize>,
        request_log: Arc<Mutex<Vec<String>>>,
        response_log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Middleware for OrderTracker {
        async fn process_request(&self, _request: &mut ApiRequest) -> Option<ApiResponse> {
            let order = self.counter.fetch_add(1, Ordering::SeqCst);
            self.request_log
                .lock()
                .unwrap()
                .push(format!("{}:{order}", self.name));
            None
        }

        async fn process_response(
            &self,
            _request: &ApiRequest,
            response: ApiResponse,
        ) -> ApiResponse {
            self.response_log
                .lock()
                .unwrap()
                .push(self.name.to_string());
            response
        }
    }

    fn make_handler() -> ViewHandler {
        Box::new(|_req| Box::pin(async { ApiResponse::ok(serde_json::json!("view")) }))
    }

    #[tokio::test]
    async fn test_empty_pipeline_calls_handler() {
        let pipeline = MiddlewarePipeline::new();
        let handler = make_handler();
        let response = pipeline.process(ApiRequest::builder().build(), &handler).await;
        assert!(response.envelope().is_ok());
    }

    #[tokio::test]
    async fn test_passthrough() {
        let mut pipeline = MiddlewarePipeline::new();
        pipeline.add(Passthrough);
        assert_eq!(pipeline.len(), 1);
        let handler = make_handler();
        let response = pipeline.process(ApiRequest::builder().build(), &handler).await;
        assert!(response.envelope().is_ok());
    }

    #[tokio::test]
    async fn test_short_circuit_skips_handler() {
        let mut pipeline = MiddlewarePipeline::new();
        pipeline.add(ShortCircuit);
        let handler = make_handler();
        let response = pipeline.process(ApiRequest::builder().build(), &handler).await;
        assert_eq!(response.http_status(), http::StatusCode::FORBIDDEN);
        assert_eq!(response.envelope().code, Status::CsrfFailedError.code());
    }

    #[tokio::test]
    async fn test_request_order_forward_response_order_reversed() {
        let counter = Arc::new(AtomicUsize::new(0));
        let request_log = Arc::new(Mutex::new(Vec::new()));
        let response_log = Arc::new(Mutex::new(Vec::new()));

        let mut pipeline = MiddlewarePipeline::new();
        for name in ["a", "b", "c"] {
            pipeline.add(OrderTracker {
                name,
                counter: counter.clone(),
                request_log: request_log.clone(),
                response_log: response_log.clone(),
            });
        }

        let handler = make_handler();
        pipeline.process(ApiRequest::builder().build(), &handler).await;

        assert_eq!(*request_log.lock().unwrap(), vec!["a:0", "b:1", "c:2"]);
        assert_eq!(*response_log.lock().unwrap(), vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_short_circuit_only_unwinds_processed_middleware() {
        let response_log = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = MiddlewarePipeline::new();
        pipeline.add(OrderTracker {
            name: "a",
            counter: Arc::new(AtomicUsize::new(0)),
            request_log: Arc::new(Mutex::new(Vec::new())),
            response_log: response_log.clone(),
        });
        pipeline.add(ShortCircuit);
        pipeline.add(OrderTracker {
            name: "c",
            counter: Arc::new(AtomicUsize::new(0)),
            request_log: Arc::new(Mutex::new(Vec::new())),
            response_log: response_log.clone(),
        });

        let handler = make_handler();
        let response = pipeline.process(ApiRequest::builder().build(), &handler).await;

        assert_eq!(response.http_status(), http::StatusCode::FORBIDDEN);
        assert_eq!(*response_log.lock().unwrap(), vec!["a"]);
    }

    #[test]
    fn test_debug_format() {
        let mut pipeline = MiddlewarePipeline::new();
        pipeline.add(Passthrough);
        assert!(format!("{pipeline:?}").contains("middleware_count"));
    }
}
