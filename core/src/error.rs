//! Error types for the campaign API client.
//!
//! # Design
//! Every failed remote call collapses into `ApiError::Rejected` carrying an
//! `ErrorPayload`: the server's own JSON error body when it sent one, or a
//! `{"detail": "<operation> failed"}` fallback otherwise. Callers only ever
//! inspect one shape. `status` is `None` when the request never got a
//! response.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Errors returned by `CampaignClient::parse_*` and the facade.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The call failed. `payload` is the server's error body, unmodified, or
    /// the operation's fallback `{detail}` object.
    #[error("{payload}")]
    Rejected {
        status: Option<u16>,
        payload: ErrorPayload,
    },

    /// A 2xx body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be encoded.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Operation input was missing or malformed (dynamic dispatch only).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ApiError {
    /// The error payload, for `Rejected` errors.
    pub fn payload(&self) -> Option<&ErrorPayload> {
        match self {
            ApiError::Rejected { payload, .. } => Some(payload),
            _ => None,
        }
    }

    /// The `detail` string of a rejected call, when the payload has one.
    pub fn detail(&self) -> Option<&str> {
        self.payload().and_then(ErrorPayload::detail)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => *status,
            _ => None,
        }
    }
}

/// Normalized error object surfaced to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ErrorPayload(Value);

impl ErrorPayload {
    /// The `{"detail": message}` object used when no server body is usable.
    pub fn fallback(message: &str) -> Self {
        Self(serde_json::json!({ "detail": message }))
    }

    /// Wrap a server-sent error body as-is.
    pub fn from_body(body: Value) -> Self {
        Self(body)
    }

    /// `detail` when it is a string. FastAPI validation errors carry a list
    /// here, in which case this returns `None`.
    pub fn detail(&self) -> Option<&str> {
        self.0.get("detail").and_then(Value::as_str)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detail() {
            Some(detail) => f.write_str(detail),
            None => write!(f, "{}", self.0),
        }
    }
}

/// The request never produced a response (DNS, connect, TLS, reset...).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("transport failed: {0}")]
pub struct TransportError(pub String);

/// Failures reading or writing the token store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("token file is not a JSON object: {0}")]
    Json(#[from] serde_json::Error),

    #[error("token store lock poisoned")]
    Poisoned,
}
