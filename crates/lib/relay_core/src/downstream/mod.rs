//! Downstream text-generation API.
//!
//! The relay talks to the generation endpoint only through
//! [`CompletionClient`], so handlers stay independent of any vendor or HTTP
//! library and tests can substitute a scripted client.
//!
//! # Providers
//!
//! - [`openai::OpenAiClient`]: OpenAI-compatible `chat/completions` API

pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::GenerationParams;
use crate::taxonomy::ErrorCode;

/// Errors raised by a downstream completion call.
#[derive(Debug, Clone, Error)]
pub enum DownstreamError {
    /// The provider answered with an error body.
    #[error("Provider error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        kind: Option<String>,
        message: String,
    },

    #[error("Provider request timed out")]
    Timeout,

    #[error("Provider request failed: {0}")]
    Transport(String),

    #[error("Provider response parse error: {0}")]
    Decode(String),

    #[error("Provider returned an empty reply")]
    EmptyReply,
}

impl DownstreamError {
    /// Maps the fault onto the client-facing taxonomy.
    pub fn error_code(&self) -> ErrorCode {
        map_downstream_error(self)
    }
}

/// Sends a system instruction plus one user message and returns the reply.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        params: &GenerationParams,
    ) -> Result<String, DownstreamError>;
}

/// Re-expresses a downstream fault as one of the stable taxonomy entries.
pub fn map_downstream_error(err: &DownstreamError) -> ErrorCode {
    match err {
        DownstreamError::Api {
            status, code, kind, ..
        } => {
            let tagged = |tag: &str| code.as_deref() == Some(tag) || kind.as_deref() == Some(tag);
            if tagged("insufficient_quota") {
                ErrorCode::QuotaExceeded
            } else if tagged("invalid_api_key") || *status == 401 {
                ErrorCode::InvalidKey
            } else if tagged("rate_limit_exceeded") || *status == 429 {
                ErrorCode::RateLimit
            } else if tagged("context_length_exceeded") {
                ErrorCode::ContextLength
            } else {
                ErrorCode::ServerError
            }
        }
        DownstreamError::Timeout => ErrorCode::Timeout,
        DownstreamError::Transport(_) | DownstreamError::Decode(_) | DownstreamError::EmptyReply => {
            ErrorCode::ServerError
        }
    }
}
