//! # restkit-views
//!
//! View layer for the restkit toolkit: the [`ApiView`](api_view::ApiView)
//! trait with verb dispatch and exception normalization, and the
//! [`Middleware`](middleware::Middleware) pipeline views are wrapped in.

pub mod api_view;
pub mod middleware;

pub use api_view::{ApiView, HandlerResult};
pub use middleware::{Middleware, MiddlewarePipeline, ViewHandler};
