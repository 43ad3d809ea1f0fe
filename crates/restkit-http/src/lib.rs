//! # restkit-http
//!
//! HTTP layer for the restkit toolkit: the [`ApiRequest`] type with its
//! builder and axum integration, and the envelope-backed [`ApiResponse`].

pub mod request;
pub mod response;

pub use request::{ApiRequest, ApiRequestBuilder};
pub use response::ApiResponse;
