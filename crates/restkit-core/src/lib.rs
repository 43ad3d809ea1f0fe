//! # restkit-core
//!
//! Core types for the restkit toolkit. This crate has no framework
//! dependencies and provides the foundation for all other crates.
//!
//! ## Modules
//!
//! - [`status`] - The closed catalog of `(code, message)` response statuses
//! - [`envelope`] - The uniform `{code, message, data}` response wrapper
//! - [`error`] - Error taxonomy and result aliases
//! - [`settings`] - Toolkit settings and global configuration
//! - [`logging`] - Tracing-based logging integration

pub mod envelope;
pub mod error;
pub mod logging;
pub mod settings;
pub mod status;

// Re-export the most commonly used types at the crate root.
pub use envelope::Envelope;
pub use error::{ApiError, ApiResult, FieldErrors, ValidationFailure};
pub use settings::{CsrfExemptPaths, Settings, SETTINGS};
pub use status::Status;
