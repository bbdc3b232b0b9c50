//! Request/response shapes for the accounts API.
//!
//! DESIGN
//! ======
//! Responses are kept as `status + JSON body` rather than typed per endpoint:
//! the session store decides what counts as success, and `register` hands the
//! raw outcome straight back to the form so server messages survive intact.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const STATUS_OK: u16 = 200;
pub const STATUS_CREATED: u16 = 201;

/// Transport-level failures. An HTTP error status is not an `ApiError`; it
/// arrives as an ordinary [`ApiResponse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    #[error("response body unreadable: {0}")]
    Decode(String),

    /// No browser transport in this build (native tests, non-`csr` builds).
    #[error("identity API not available in this build")]
    Unavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON body; a non-JSON body is kept as a string, an empty one as null.
    pub body: Value,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Build from raw response text.
    #[must_use]
    pub fn from_text(status: u16, text: &str) -> Self {
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned()))
        };
        Self { status, body }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    #[must_use]
    pub fn is_ok_or_created(&self) -> bool {
        matches!(self.status, STATUS_OK | STATUS_CREATED)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The server's human-readable `detail` message, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match &self.body {
            Value::Object(map) => map.get("detail").and_then(Value::as_str),
            Value::String(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub username: String,
    pub password: String,
}

/// Body of `GET accounts/userinfo/`. Only the fields the session needs are
/// read; everything else in the profile is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IdentityPayload {
    #[serde(default, alias = "handle")]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub is_staff: Option<bool>,
    #[serde(default)]
    pub is_superuser: Option<bool>,
}

impl IdentityPayload {
    /// Parse a userinfo body. `None` when the body is not an object of the
    /// expected shape or carries no usable handle.
    #[must_use]
    pub fn from_body(body: &Value) -> Option<Self> {
        let payload = Self::deserialize(body).ok()?;
        payload.handle()?;
        Some(payload)
    }

    #[must_use]
    pub fn handle(&self) -> Option<&str> {
        self.username.as_deref().map(str::trim).filter(|h| !h.is_empty())
    }
}
