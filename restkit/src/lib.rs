//! # restkit
//!
//! A REST toolkit for Rust web services: uniform response envelopes, token
//! authentication, CSRF exemption middleware, and first-error request
//! validation.
//!
//! This is the meta-crate that re-exports all sub-crates for convenient
//! access. Depend on `restkit` for the whole toolkit, or on individual
//! crates for finer-grained control.

/// Status catalog, response envelope, errors, settings, and logging.
pub use restkit_core as core;

/// HTTP layer: `ApiRequest`, `ApiResponse`, and axum integration.
#[cfg(feature = "http")]
pub use restkit_http as http;

/// The `ApiView` trait and the middleware pipeline.
#[cfg(feature = "views")]
pub use restkit_views as views;

/// Declarative validation with first-error short-circuiting.
#[cfg(feature = "serializers")]
pub use restkit_serializers as serializers;

/// Token authentication: token pairs, user stores, CSRF, token endpoints.
#[cfg(feature = "auth")]
pub use restkit_auth as auth;
