//! Error types for the restkit toolkit.
//!
//! [`ApiError`] is the single error type surfaced by request handlers and the
//! auth/token machinery. Every variant maps to an entry in the
//! [status catalog](crate::status), so any error can be normalized into the
//! uniform response envelope without leaking internal detail.

use thiserror::Error;

use crate::envelope::Envelope;
use crate::status::Status;

/// Per-field validation errors in declaration order.
///
/// Keys are field names; values are ordered lists of symbolic error codes
/// (e.g. `required`, `invalid`, or a catalog entry name).
pub type FieldErrors = Vec<(String, Vec<String>)>;

/// The outcome of a failed validation run.
///
/// Validation short-circuiting is expressed as a value rather than an
/// exception: the serializer either resolves the first error code to a
/// catalog entry, or reports the complete field-error map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    /// The first field's first error code named a catalog entry; all other
    /// errors are dropped.
    Status(Status),
    /// No catalog entry matched; the full ordered error map is reported.
    Fields(FieldErrors),
}

impl ValidationFailure {
    /// Returns the catalog entry this failure reports.
    pub const fn status(&self) -> Status {
        match self {
            Self::Status(status) => *status,
            Self::Fields(_) => Status::ValidationError,
        }
    }
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status(status) => write!(f, "{status}"),
            Self::Fields(fields) => {
                let mut first = true;
                for (field, codes) in fields {
                    if !first {
                        write!(f, "; ")?;
                    }
                    write!(f, "{field}: {}", codes.join(", "))?;
                    first = false;
                }
                Ok(())
            }
        }
    }
}

/// The primary error type for restkit request handling.
///
/// Variants cover the taxonomy the exception normalizer dispatches on:
/// method-not-allowed, validation failures (which carry their own status),
/// authentication and token failures, and a catch-all for everything else.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The HTTP method has no handler on the target view.
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Request data failed validation.
    #[error("Validation failed: {0}")]
    Validation(ValidationFailure),

    /// The request could not be authenticated.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// A token was structurally invalid, mis-signed, or expired.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// The toolkit is misconfigured (e.g. an unknown user-model binding).
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    /// A body or payload could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An unclassified failure.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl ApiError {
    /// Returns the catalog entry this error is reported as.
    ///
    /// Unmatched kinds collapse to [`Status::UnexpectedError`]; the detail is
    /// for server-side logs only and never reaches the caller.
    pub const fn status(&self) -> Status {
        match self {
            Self::MethodNotAllowed(_) => Status::MethodNotAllowedError,
            Self::Validation(failure) => failure.status(),
            Self::AuthenticationFailed(_) => Status::AuthFailedError,
            Self::InvalidToken(_) => Status::TokenError,
            Self::Serialization(_) => Status::ValidationError,
            Self::ImproperlyConfigured(_) | Self::Unexpected(_) => Status::UnexpectedError,
        }
    }

    /// Builds the uniform error envelope for this error.
    ///
    /// The generic validation case carries the full field-error map as
    /// `data`; every other case is code and message only.
    pub fn envelope(&self) -> Envelope {
        let envelope = Envelope::from_status(self.status());
        match self {
            Self::Validation(ValidationFailure::Fields(fields)) => {
                let map: serde_json::Map<String, serde_json::Value> = fields
                    .iter()
                    .map(|(field, codes)| {
                        (field.clone(), serde_json::json!(codes))
                    })
                    .collect();
                envelope.with_data(serde_json::Value::Object(map))
            }
            _ => envelope,
        }
    }
}

impl From<ValidationFailure> for ApiError {
    fn from(failure: ValidationFailure) -> Self {
        Self::Validation(failure)
    }
}

/// A convenience type alias for `Result<T, ApiError>`.
pub type ApiResult<T> = Result<T, ApiError>;
