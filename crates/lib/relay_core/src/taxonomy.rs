//! Client-facing error taxonomy.
//!
//! Every failure surfaced by the relay (or observed by the client) is one of
//! the [`ErrorCode`] variants. Each variant carries a fixed HTTP status and a
//! retry classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of error classes shared by server and client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed, oversized or empty input.
    Validation,
    /// Downstream account or billing limit reached.
    QuotaExceeded,
    /// Downstream credential rejected.
    InvalidKey,
    /// Downstream throttling.
    RateLimit,
    /// Input exceeds the downstream model capacity.
    ContextLength,
    /// Request deadline elapsed.
    Timeout,
    /// Client cannot reach the relay at all. Never produced by the server.
    Network,
    /// Unclassified failure.
    ServerError,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 8] = [
        ErrorCode::Validation,
        ErrorCode::QuotaExceeded,
        ErrorCode::InvalidKey,
        ErrorCode::RateLimit,
        ErrorCode::ContextLength,
        ErrorCode::Timeout,
        ErrorCode::Network,
        ErrorCode::ServerError,
    ];

    /// Wire representation of the code.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Validation => "validation",
            ErrorCode::QuotaExceeded => "quota_exceeded",
            ErrorCode::InvalidKey => "invalid_key",
            ErrorCode::RateLimit => "rate_limit",
            ErrorCode::ContextLength => "context_length",
            ErrorCode::Timeout => "timeout",
            ErrorCode::Network => "network",
            ErrorCode::ServerError => "server_error",
        }
    }

    /// HTTP status the relay answers with. `None` for client-only classes.
    pub fn http_status(self) -> Option<u16> {
        match self {
            ErrorCode::Validation | ErrorCode::ContextLength => Some(400),
            ErrorCode::InvalidKey => Some(401),
            ErrorCode::Timeout => Some(408),
            ErrorCode::QuotaExceeded | ErrorCode::RateLimit => Some(429),
            ErrorCode::ServerError => Some(500),
            ErrorCode::Network => None,
        }
    }

    /// Whether the client may offer to resend the same message.
    pub fn is_retryable(self) -> bool {
        match self {
            ErrorCode::RateLimit
            | ErrorCode::Timeout
            | ErrorCode::Network
            | ErrorCode::ServerError => true,
            ErrorCode::Validation
            | ErrorCode::QuotaExceeded
            | ErrorCode::InvalidKey
            | ErrorCode::ContextLength => false,
        }
    }

    /// Classifies a bare HTTP status when the error body carries no code.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ErrorCode::Validation,
            401 => ErrorCode::InvalidKey,
            408 => ErrorCode::Timeout,
            429 => ErrorCode::RateLimit,
            500..=599 => ErrorCode::ServerError,
            _ => ErrorCode::Validation,
        }
    }

    /// Fixed user-facing text for the class. Relay and client both use it.
    pub const fn user_message(self) -> &'static str {
        match self {
            ErrorCode::Validation => "Your message could not be processed. Please check it and try again.",
            ErrorCode::QuotaExceeded => "API quota exceeded. Please check the plan and billing details.",
            ErrorCode::InvalidKey => "Invalid API key configuration. Please contact the administrator.",
            ErrorCode::RateLimit => "Too many requests. Please wait a moment and try again.",
            ErrorCode::ContextLength => "Message is too long for the model to process. Please shorten it.",
            ErrorCode::Timeout => "The request took too long to complete. Please try again.",
            ErrorCode::Network => "Unable to reach the server. Please check your connection.",
            ErrorCode::ServerError => "An unexpected error occurred. Please try again later.",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    /// Diagnostic detail, only ever set outside production.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(code: ErrorCode, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: Some(code),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Option<String>) -> Self {
        self.details = details;
        self
    }
}
