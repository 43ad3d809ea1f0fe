//! The response status catalog.
//!
//! Every API response, success or failure, carries an entry from this catalog
//! as its application-level `(code, message)` pair. The catalog is closed and
//! append-only: codes are stable identifiers exposed to API consumers, so new
//! entries may be added but existing codes are never reassigned.

use serde::{Deserialize, Serialize};

/// A named entry in the response status catalog.
///
/// Each variant resolves to a numeric code and a human-readable message.
/// Codes are grouped by family: `2xxxx` success, `4xxxx` client errors,
/// `5xxxx` server errors.
///
/// # Examples
///
/// ```
/// use restkit_core::status::Status;
///
/// assert_eq!(Status::Ok.code(), 20000);
/// assert_eq!(Status::from_name("TOKEN_ERROR"), Some(Status::TokenError));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// The request was handled successfully.
    Ok,
    /// The HTTP method is not supported by the endpoint.
    MethodNotAllowedError,
    /// The request body failed validation.
    ValidationError,
    /// The request could not be authenticated.
    AuthFailedError,
    /// The supplied token is invalid or has expired.
    TokenError,
    /// An unclassified server-side failure.
    UnexpectedError,
    /// CSRF verification failed.
    CsrfFailedError,
}

impl Status {
    /// Every catalog entry. Used to check global code uniqueness.
    pub const ALL: [Self; 7] = [
        Self::Ok,
        Self::MethodNotAllowedError,
        Self::ValidationError,
        Self::AuthFailedError,
        Self::TokenError,
        Self::UnexpectedError,
        Self::CsrfFailedError,
    ];

    /// Returns the numeric code for this entry.
    pub const fn code(self) -> u32 {
        match self {
            Self::Ok => 20000,
            Self::MethodNotAllowedError => 40000,
            Self::ValidationError => 40001,
            Self::AuthFailedError => 40002,
            Self::TokenError => 40003,
            Self::UnexpectedError => 50000,
            Self::CsrfFailedError => 50001,
        }
    }

    /// Returns the human-readable message for this entry.
    pub const fn message(self) -> &'static str {
        match self {
            Self::Ok => "Success",
            Self::MethodNotAllowedError => "Request method not allowed",
            Self::ValidationError => "Malformed request data",
            Self::AuthFailedError => "Authentication failed",
            Self::TokenError => "Token is invalid or expired",
            Self::UnexpectedError => "Unexpected error",
            Self::CsrfFailedError => "CSRF verification failed",
        }
    }

    /// Returns the symbolic name for this entry.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::MethodNotAllowedError => "METHOD_NOT_ALLOWED_ERROR",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::AuthFailedError => "AUTH_FAILED_ERROR",
            Self::TokenError => "TOKEN_ERROR",
            Self::UnexpectedError => "UNEXPECTED_ERROR",
            Self::CsrfFailedError => "CSRF_FAILED_ERROR",
        }
    }

    /// Looks up a catalog entry by its symbolic name.
    ///
    /// This is how the first-error serializer resolves field error codes to
    /// catalog entries: an error code that names an entry short-circuits
    /// validation with that entry's status.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.name() == name)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}
