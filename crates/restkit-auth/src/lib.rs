//! # restkit-auth
//!
//! Token authentication for the restkit toolkit.
//!
//! ## Overview
//!
//! - [`tokens`]: signed refresh/access token pairs (HMAC-SHA256).
//! - [`store`]: the [`UserStore`](store::UserStore) seam and the
//!   model-binding registry.
//! - [`authentication`]: bearer-token request authentication.
//! - [`csrf`]: CSRF enforcement with a configurable exemption list.
//! - [`views`]: the obtain/refresh/verify token endpoints.

pub mod authentication;
pub mod csrf;
pub mod store;
pub mod tokens;
pub mod views;

pub use authentication::{TokenAuthentication, TokenPrincipal};
pub use csrf::CsrfMiddleware;
pub use store::{AuthUser, MemoryUserStore, StoreRegistry, UserStore};
pub use tokens::{TokenConfig, TokenPair};
pub use views::{TokenObtainPairView, TokenRefreshView, TokenVerifyView};
