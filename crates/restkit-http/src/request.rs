//! HTTP request type.
//!
//! [`ApiRequest`] carries the request method, path, headers, raw body, and a
//! META map for server-level metadata. The toolkit speaks JSON, so the body
//! is deserialized on demand via [`ApiRequest::json`]; there is no form or
//! multipart parsing.

use std::collections::HashMap;

use http::{HeaderMap, Method};

use restkit_core::error::ApiError;

/// An incoming API request.
///
/// Instances are built from an axum request via [`ApiRequest::from_parts`],
/// or constructed directly with [`ApiRequest::builder`] in tests and
/// middleware.
///
/// # Examples
///
/// ```
/// use restkit_http::ApiRequest;
///
/// let request = ApiRequest::builder()
///     .method(http::Method::POST)
///     .path("/api/token/")
///     .json(&serde_json::json!({"refresh": "abc"}))
///     .build();
///
/// assert_eq!(request.method(), &http::Method::POST);
/// assert_eq!(request.path(), "/api/token/");
/// ```
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query_string: String,
    content_type: Option<String>,
    headers: HeaderMap,
    meta: HashMap<String, String>,
    body: Vec<u8>,
}

impl ApiRequest {
    /// Creates a new [`ApiRequestBuilder`].
    pub fn builder() -> ApiRequestBuilder {
        ApiRequestBuilder::default()
    }

    /// Creates an `ApiRequest` from axum/hyper request parts and body bytes.
    ///
    /// Header values are mirrored into the META map under `HTTP_*` keys, the
    /// way WSGI-style frameworks expose them, so middleware and stores can
    /// read ambient request state without touching the header map.
    pub fn from_parts(parts: http::request::Parts, body: Vec<u8>) -> Self {
        let method = parts.method;
        let uri = parts.uri;
        let headers = parts.headers;

        let path = uri.path().to_string();
        let query_string = uri.query().unwrap_or("").to_string();

        let content_type = headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let mut meta = HashMap::new();
        for (name, value) in &headers {
            let meta_key = format!("HTTP_{}", name.as_str().to_uppercase().replace('-', "_"));
            if let Ok(v) = value.to_str() {
                meta.insert(meta_key, v.to_string());
            }
        }
        meta.insert("REQUEST_METHOD".to_string(), method.to_string());
        meta.insert("PATH_INFO".to_string(), path.clone());
        meta.insert("QUERY_STRING".to_string(), query_string.clone());
        meta.insert("CONTENT_LENGTH".to_string(), body.len().to_string());
        if let Some(ct) = &content_type {
            meta.insert("CONTENT_TYPE".to_string(), ct.clone());
        }

        Self {
            method,
            path,
            query_string,
            content_type,
            headers,
            meta,
            body,
        }
    }

    /// Returns the HTTP method.
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path (without query string).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the raw query string (without the leading `?`).
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Returns the content type of the request body, if set.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Returns the request headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the META dictionary containing server-level metadata.
    ///
    /// Keys include `REQUEST_METHOD`, `PATH_INFO`, and `HTTP_*` entries for
    /// each header.
    pub const fn meta(&self) -> &HashMap<String, String> {
        &self.meta
    }

    /// Returns a mutable reference to the META dictionary.
    ///
    /// Middleware and test fixtures use this to inject ambient state such as
    /// `REMOTE_USER`.
    pub fn meta_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.meta
    }

    /// Returns the raw request body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Deserializes the request body as JSON into `T`.
    ///
    /// An empty body deserializes as `{}` so endpoints with no required
    /// fields accept bodyless POSTs.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Serialization`] on malformed JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, ApiError> {
        let bytes: &[u8] = if self.body.is_empty() {
            b"{}"
        } else {
            &self.body
        };
        serde_json::from_slice(bytes)
            .map_err(|e| ApiError::Serialization(format!("Invalid JSON body: {e}")))
    }

    /// Deserializes the request body as a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Serialization`] on malformed JSON.
    pub fn json_value(&self) -> Result<serde_json::Value, ApiError> {
        self.json()
    }
}

/// Builder for [`ApiRequest`].
#[derive(Debug, Default)]
pub struct ApiRequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    query_string: Option<String>,
    content_type: Option<String>,
    headers: HeaderMap,
    meta: HashMap<String, String>,
    body: Vec<u8>,
}

impl ApiRequestBuilder {
    /// Sets the HTTP method. Defaults to GET.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the request path. Defaults to `/`.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the query string.
    #[must_use]
    pub fn query_string(mut self, query_string: impl Into<String>) -> Self {
        self.query_string = Some(query_string.into());
        self
    }

    /// Sets the content type.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Adds a header. Invalid names or values are silently dropped.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            http::header::HeaderName::try_from(name),
            http::header::HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Adds a META entry.
    #[must_use]
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Sets the raw body bytes.
    #[must_use]
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Serializes `data` as the JSON body and sets the content type.
    #[must_use]
    pub fn json<T: serde::Serialize>(mut self, data: &T) -> Self {
        if let Ok(bytes) = serde_json::to_vec(data) {
            self.body = bytes;
            self.content_type = Some("application/json".to_string());
        }
        self
    }

    /// Builds the [`ApiRequest`].
    pub fn build(self) -> ApiRequest {
        let method = self.method.unwrap_or(Method::GET);
        let path = self.path.unwrap_or_else(|| "/".to_string());
        let query_string = self.query_string.unwrap_or_default();

        let mut meta = self.meta;
        meta.entry("REQUEST_METHOD".to_string())
            .or_insert_with(|| method.to_string());
        meta.entry("PATH_INFO".to_string())
            .or_insert_with(|| path.clone());

        ApiRequest {
            method,
            path,
            query_string,
            content_type: self.content_type,
            headers: self.headers,
            meta,
            body: self.body,
        }
    }
}
