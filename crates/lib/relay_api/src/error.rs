//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use relay_core::downstream::DownstreamError;
use relay_core::taxonomy::{ErrorCode, ErrorEnvelope};
use thiserror::Error;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

pub const MESSAGE_REQUIRED: &str = "Message is required and must be a non-empty string";
pub const NOT_CONFIGURED: &str =
    "Chat service is not configured. Please contact the administrator.";
pub const UNEXPECTED: &str = ErrorCode::ServerError.user_message();

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Downstream credential not configured")]
    NotConfigured,

    #[error("Downstream error: {source}")]
    Downstream {
        source: DownstreamError,
        expose_details: bool,
    },

    #[error("Internal server error")]
    Internal { details: Option<String> },
}

impl AppError {
    pub fn downstream(source: DownstreamError, expose_details: bool) -> Self {
        AppError::Downstream {
            source,
            expose_details,
        }
    }

    /// Taxonomy entry for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation(_) => ErrorCode::Validation,
            AppError::NotConfigured | AppError::Internal { .. } => ErrorCode::ServerError,
            AppError::Downstream { source, .. } => source.error_code(),
        }
    }

    fn envelope(&self) -> ErrorEnvelope {
        match self {
            AppError::Validation(m) => ErrorEnvelope::new(ErrorCode::Validation, m.as_str()),
            AppError::NotConfigured => ErrorEnvelope::new(ErrorCode::ServerError, NOT_CONFIGURED),
            AppError::Downstream {
                source,
                expose_details,
            } => {
                let code = source.error_code();
                let envelope = ErrorEnvelope::new(code, code.user_message());
                // Only the unclassified fallback carries diagnostics.
                if code == ErrorCode::ServerError && *expose_details {
                    envelope.with_details(Some(source.to_string()))
                } else {
                    envelope
                }
            }
            AppError::Internal { details } => {
                ErrorEnvelope::new(ErrorCode::ServerError, UNEXPECTED).with_details(details.clone())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self
            .code()
            .http_status()
            .and_then(|s| StatusCode::from_u16(s).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.envelope())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, code: &str) -> DownstreamError {
        DownstreamError::Api {
            status,
            code: Some(code.into()),
            kind: None,
            message: "raw provider text".into(),
        }
    }

    #[test]
    fn validation_is_400() {
        let resp = AppError::Validation(MESSAGE_REQUIRED.into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_configured_is_500_server_error() {
        let err = AppError::NotConfigured;
        assert_eq!(err.code(), ErrorCode::ServerError);
        assert_eq!(err.envelope().error, NOT_CONFIGURED);
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn mapped_downstream_errors_hide_provider_text() {
        let err = AppError::downstream(api(429, "insufficient_quota"), true);
        let env = err.envelope();
        assert_eq!(env.code, Some(ErrorCode::QuotaExceeded));
        assert!(env.details.is_none());
        assert!(!env.error.contains("raw provider text"));
        assert_eq!(err.into_response().status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn unmapped_downstream_error_details_follow_environment() {
        let dev = AppError::downstream(api(500, "mystery"), true).envelope();
        assert_eq!(dev.code, Some(ErrorCode::ServerError));
        assert!(dev.details.as_deref().is_some_and(|d| d.contains("raw provider text")));

        let prod = AppError::downstream(api(500, "mystery"), false).envelope();
        assert!(prod.details.is_none());
        assert_eq!(prod.error, UNEXPECTED);
    }

    #[test]
    fn downstream_text_comes_from_taxonomy() {
        for (source, code) in [
            (api(429, "insufficient_quota"), ErrorCode::QuotaExceeded),
            (api(401, "invalid_api_key"), ErrorCode::InvalidKey),
            (api(429, "rate_limit_exceeded"), ErrorCode::RateLimit),
            (api(400, "context_length_exceeded"), ErrorCode::ContextLength),
            (DownstreamError::Timeout, ErrorCode::Timeout),
            (api(500, "mystery"), ErrorCode::ServerError),
        ] {
            let env = AppError::downstream(source, false).envelope();
            assert_eq!(env.code, Some(code));
            assert_eq!(env.error, code.user_message());
        }
        assert_eq!(UNEXPECTED, ErrorCode::ServerError.user_message());
    }

    #[test]
    fn downstream_timeout_is_408() {
        let resp = AppError::downstream(DownstreamError::Timeout, false).into_response();
        assert_eq!(resp.status(), StatusCode::REQUEST_TIMEOUT);
    }
}
