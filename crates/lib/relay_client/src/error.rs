//! Client error type.

use relay_core::taxonomy::ErrorCode;
use serde_json::Value;
use thiserror::Error;

/// A failed chat or health request, classified into the taxonomy.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ClientError {
    pub code: ErrorCode,
    pub message: String,
    /// HTTP status, when a response was received at all.
    pub status: Option<u16>,
}

impl ClientError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
        }
    }

    /// Request deadline elapsed.
    pub fn timeout() -> Self {
        Self::new(ErrorCode::Timeout, ErrorCode::Timeout.user_message())
    }

    /// The relay could not be reached.
    pub fn network(detail: impl Into<String>) -> Self {
        Self::new(ErrorCode::Network, detail)
    }

    /// Builds an error from a non-2xx response. An unparseable body is
    /// treated as an empty object.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let body = serde_json::from_slice::<Value>(body)
            .ok()
            .filter(Value::is_object)
            .unwrap_or_else(|| Value::Object(Default::default()));

        let message = body
            .get("error")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP error! status: {status}"));

        let code = body
            .get("code")
            .and_then(|c| serde_json::from_value::<ErrorCode>(c.clone()).ok())
            .unwrap_or_else(|| ErrorCode::from_status(status));

        Self {
            code,
            message,
            status: Some(status),
        }
    }

    /// Whether a resend may be offered. Any 5xx counts as retryable.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable() || self.status.is_some_and(|s| s >= 500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_envelope_is_used() {
        let err = ClientError::from_response(
            429,
            br#"{"error":"Too many requests","code":"rate_limit"}"#,
        );
        assert_eq!(err.code, ErrorCode::RateLimit);
        assert_eq!(err.message, "Too many requests");
        assert_eq!(err.status, Some(429));
        assert!(err.is_retryable());
    }

    #[test]
    fn garbage_body_falls_back_to_status() {
        let err = ClientError::from_response(502, b"<html>Bad Gateway</html>");
        assert_eq!(err.code, ErrorCode::ServerError);
        assert_eq!(err.message, "HTTP error! status: 502");
        assert!(err.is_retryable());
    }

    #[test]
    fn unknown_code_falls_back_to_status() {
        let err = ClientError::from_response(400, br#"{"error":"nope","code":"mystery"}"#);
        assert_eq!(err.code, ErrorCode::Validation);
        assert_eq!(err.message, "nope");
        assert!(!err.is_retryable());
    }

    #[test]
    fn non_object_body_is_ignored() {
        let err = ClientError::from_response(500, b"[1,2,3]");
        assert_eq!(err.message, "HTTP error! status: 500");
    }

    #[test]
    fn quota_is_not_retryable_even_as_429() {
        let err = ClientError::from_response(429, br#"{"error":"quota","code":"quota_exceeded"}"#);
        assert!(!err.is_retryable());
    }

    #[test]
    fn timeout_and_network_are_retryable() {
        assert!(ClientError::timeout().is_retryable());
        assert!(ClientError::network("refused").is_retryable());
    }
}
