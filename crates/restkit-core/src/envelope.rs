//! The uniform response envelope.
//!
//! Every response body is an [`Envelope`]: the application-level `code` and
//! `message` from the [status catalog](crate::status), plus an optional
//! `data` payload. Envelopes are built per request and discarded after
//! serialization.

use serde::Serialize;

use crate::status::Status;

/// The uniform `{code, message, data}` response wrapper.
///
/// `data` is omitted from the serialized form when absent. Endpoints that
/// must report an explicit `data: null` (e.g. token verification) set the
/// payload to [`serde_json::Value::Null`].
///
/// # Examples
///
/// ```
/// use restkit_core::envelope::Envelope;
/// use restkit_core::status::Status;
/// use serde_json::json;
///
/// let envelope = Envelope::ok(json!({"access": "..."}));
/// assert_eq!(envelope.code, 20000);
///
/// let error = Envelope::from_status(Status::TokenError);
/// assert!(error.data.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    /// The application-level status code.
    pub code: u32,
    /// The human-readable status message.
    pub message: String,
    /// The response payload, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Envelope {
    /// Creates an envelope from a catalog entry with no payload.
    pub fn from_status(status: Status) -> Self {
        Self {
            code: status.code(),
            message: status.message().to_string(),
            data: None,
        }
    }

    /// Creates an OK envelope carrying the given payload.
    pub fn ok(data: serde_json::Value) -> Self {
        Self::from_status(Status::Ok).with_data(data)
    }

    /// Attaches a payload to this envelope.
    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Returns `true` if this envelope carries the OK status.
    pub const fn is_ok(&self) -> bool {
        self.code == Status::Ok.code()
    }
}

impl From<Status> for Envelope {
    fn from(status: Status) -> Self {
        Self::from_status(status)
    }
}
