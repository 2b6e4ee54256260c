//! The normalized API error and the rules that build it from upstream failures.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message used when neither the upstream body nor the transport supplies one.
pub const FALLBACK_MESSAGE: &str = "An error occurred";

/// Error code attached when a successful response cannot be decoded.
pub const DECODE_ERROR: &str = "DECODE_ERROR";

/// Normalized error shape every failed API call resolves to.
///
/// Transport-level failures (network unreachable, timeout) carry no `status`.
/// Upstream rejections carry the HTTP status and, when the server supplies
/// them, a `code` and structured `details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            status: None,
            details: None,
        }
    }

    /// Build an error for a non-2xx response.
    ///
    /// `body` is the raw response text; it does not have to be JSON.
    pub fn from_http(status: u16, body: &str) -> Self {
        let upstream = serde_json::from_str::<Value>(body).ok();
        let generic = format!("Request failed with status code {status}");
        normalize(upstream.as_ref(), Some(&generic), None, Some(status))
    }

    /// Build an error for a request that never produced a response.
    pub fn from_transport(message: &str, code: Option<&str>) -> Self {
        normalize(None, Some(message), code, None)
    }

    /// Build an error for a 2xx response whose payload has the wrong shape.
    pub fn decode(status: u16, reason: impl std::fmt::Display) -> Self {
        Self {
            message: format!("Failed to decode response: {reason}"),
            code: Some(DECODE_ERROR.to_string()),
            status: Some(status),
            details: None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }
}

/// Apply the precedence rules that turn heterogeneous failures into an [`ApiError`].
///
/// Message: upstream `message`, then an RFC 7807 `detail`/`title`, then the
/// transport's own message, then [`FALLBACK_MESSAGE`]. Code: upstream `code`,
/// then the transport code. Details come only from the upstream body.
pub fn normalize(
    upstream: Option<&Value>,
    transport_message: Option<&str>,
    transport_code: Option<&str>,
    status: Option<u16>,
) -> ApiError {
    let message = upstream
        .and_then(|body| non_empty_str(body.get("message")))
        .or_else(|| upstream.and_then(problem_detail))
        .or_else(|| transport_message.and_then(non_empty))
        .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());

    let code = upstream
        .and_then(|body| body.get("code"))
        .and_then(code_string)
        .or_else(|| transport_code.and_then(non_empty));

    let details = upstream
        .and_then(|body| body.get("details"))
        .filter(|details| !details.is_null())
        .cloned();

    ApiError {
        message,
        code,
        status,
        details,
    }
}

/// Attempt to read an RFC7807 (or RFC7807-ish) body into a user-facing message.
/// Prefers `detail`, falls back to `title`.
pub fn problem_detail(body: &Value) -> Option<String> {
    non_empty_str(body.get("detail")).or_else(|| non_empty_str(body.get("title")))
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).and_then(non_empty)
}

fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn code_string(value: &Value) -> Option<String> {
    match value {
        Value::String(code) => non_empty(code),
        Value::Number(code) => Some(code.to_string()),
        _ => None,
    }
}
