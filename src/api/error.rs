use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Generic fallback shown when no better message is available.
const GENERIC_MESSAGE: &str = "Something went wrong. Please try again.";

/// Message for connectivity problems (timeouts, refused connections).
const NETWORK_MESSAGE: &str = "Network error. Please check your connection and try again.";

/// Categories of API errors for consistent error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// HTTP status error (4xx, 5xx)
    HttpStatus,
    /// Connection failure or request timeout
    Timeout,
    /// Failed to parse a response body
    Parse,
    /// Client-side condition (e.g., no refresh token available)
    Session,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::HttpStatus => write!(f, "http_status"),
            ApiErrorKind::Timeout => write!(f, "timeout"),
            ApiErrorKind::Parse => write!(f, "parse"),
            ApiErrorKind::Session => write!(f, "session"),
        }
    }
}

/// Structured error from the HTTP layer with kind and details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error category
    pub kind: ApiErrorKind,
    /// One-line summary suitable for logs
    pub message: String,
    /// HTTP status, when the server answered
    pub status: Option<u16>,
    /// Raw response body, when available
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            details: None,
        }
    }

    /// Creates an HTTP status error, keeping the raw body for extraction.
    pub fn http_status(status: u16, body: &str) -> Self {
        Self {
            kind: ApiErrorKind::HttpStatus,
            message: format!("HTTP {status}"),
            status: Some(status),
            details: if body.is_empty() {
                None
            } else {
                Some(body.to_string())
            },
        }
    }

    /// Classifies a reqwest error.
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::new(ApiErrorKind::Timeout, format!("Request timed out: {e}"))
        } else if e.is_connect() {
            Self::new(ApiErrorKind::Timeout, format!("Connection failed: {e}"))
        } else if e.is_decode() {
            Self::new(ApiErrorKind::Parse, format!("Failed to decode response: {e}"))
        } else {
            Self::new(ApiErrorKind::HttpStatus, format!("Request error: {e}"))
        }
    }

    /// Returns true when the server answered 401 Unauthorized.
    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }

    /// Extracts the most specific user-facing message available.
    ///
    /// Priority order:
    /// 1. Field validation errors from the body, joined by comma
    /// 2. The general server `message` field
    /// 3. Network-specific wording for connectivity failures
    /// 4. Generic fallback
    pub fn user_message(&self) -> String {
        if let Some(body) = &self.details {
            if let Ok(json) = serde_json::from_str::<Value>(body) {
                if let Some(joined) = join_field_errors(&json) {
                    return joined;
                }
                if let Some(msg) = json.get("message").and_then(Value::as_str) {
                    if !msg.trim().is_empty() {
                        return msg.to_string();
                    }
                }
            }
        }

        if self.kind == ApiErrorKind::Timeout {
            return NETWORK_MESSAGE.to_string();
        }

        GENERIC_MESSAGE.to_string()
    }
}

/// Joins structured field-validation errors (`{"errors": [{"msg": ...}]}`).
fn join_field_errors(json: &Value) -> Option<String> {
    let errors = json.get("errors")?.as_array()?;
    let msgs: Vec<&str> = errors
        .iter()
        .filter_map(|e| {
            e.get("msg")
                .or_else(|| e.get("message"))
                .and_then(Value::as_str)
        })
        .collect();
    if msgs.is_empty() {
        None
    } else {
        Some(msgs.join(", "))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: field validation errors win over the general message.
    #[test]
    fn test_field_errors_take_priority() {
        let body = r#"{"message":"Validation failed","errors":[{"msg":"Email is required"},{"msg":"Password too short"}]}"#;
        let err = ApiError::http_status(400, body);
        assert_eq!(err.user_message(), "Email is required, Password too short");
    }

    /// Test: general server message is used when no field errors exist.
    #[test]
    fn test_server_message() {
        let err = ApiError::http_status(401, r#"{"message":"Invalid credentials"}"#);
        assert_eq!(err.user_message(), "Invalid credentials");
    }

    /// Test: connectivity failures use the network wording.
    #[test]
    fn test_network_message() {
        let err = ApiError::new(ApiErrorKind::Timeout, "Connection failed: refused");
        assert_eq!(
            err.user_message(),
            "Network error. Please check your connection and try again."
        );
    }

    /// Test: anything else falls back to the generic message.
    #[test]
    fn test_generic_fallback() {
        let err = ApiError::http_status(500, "<html>oops</html>");
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");

        let empty = ApiError::http_status(502, "");
        assert_eq!(empty.user_message(), "Something went wrong. Please try again.");
    }

    /// Test: 401 detection.
    #[test]
    fn test_is_unauthorized() {
        assert!(ApiError::http_status(401, "").is_unauthorized());
        assert!(!ApiError::http_status(403, "").is_unauthorized());
        assert!(!ApiError::new(ApiErrorKind::Timeout, "t").is_unauthorized());
    }
}
