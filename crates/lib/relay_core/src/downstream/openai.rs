//! OpenAI-compatible completion provider.
//!
//! Posts a system + user message pair to `<api_base>/chat/completions` and
//! returns the first choice's content. No retry happens here; retry is a
//! client decision driven by the error taxonomy.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::{CompletionClient, DownstreamError};
use crate::config::{DownstreamSettings, GenerationParams, join_under};

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [RequestMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Client for an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    endpoint: Url,
    api_key: String,
}

impl OpenAiClient {
    /// Builds a client with the configured base URL and request timeout.
    pub fn new(api_key: impl Into<String>, settings: &DownstreamSettings) -> Result<Self, DownstreamError> {
        let endpoint = join_under(&settings.api_base, "chat/completions")
            .map_err(|e| DownstreamError::Transport(format!("Invalid api_base: {e}")))?;
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| DownstreamError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            endpoint,
            api_key: api_key.into(),
        })
    }

    /// Fully-resolved completions URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        params: &GenerationParams,
    ) -> Result<String, DownstreamError> {
        let body = CompletionRequest {
            model: &params.model,
            messages: [
                RequestMessage {
                    role: "system",
                    content: system,
                },
                RequestMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            top_p: params.top_p,
            frequency_penalty: params.frequency_penalty,
            presence_penalty: params.presence_penalty,
        };

        let resp = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DownstreamError::Timeout
                } else {
                    DownstreamError::Transport(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "downstream returned an error body");
            return Err(parse_error_body(status.as_u16(), &text));
        }

        let data: CompletionResponse = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                DownstreamError::Timeout
            } else {
                DownstreamError::Decode(e.to_string())
            }
        })?;

        let reply = data
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if reply.is_empty() {
            return Err(DownstreamError::EmptyReply);
        }
        Ok(reply)
    }
}

/// Turns a non-2xx body into [`DownstreamError::Api`], tolerating any shape.
fn parse_error_body(status: u16, text: &str) -> DownstreamError {
    match serde_json::from_str::<ErrorBody>(text) {
        Ok(body) => DownstreamError::Api {
            status,
            code: body.error.code,
            kind: body.error.kind,
            message: body
                .error
                .message
                .unwrap_or_else(|| format!("HTTP {status}")),
        },
        Err(_) => DownstreamError::Api {
            status,
            code: None,
            kind: None,
            message: if text.is_empty() {
                format!("HTTP {status}")
            } else {
                text.to_string()
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_resolves_against_base() {
        let settings = DownstreamSettings::default();
        let client = OpenAiClient::new("sk-test", &settings).expect("client");
        assert_eq!(
            client.endpoint().as_str(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn endpoint_keeps_base_without_trailing_slash() {
        let config =
            crate::config::RelayConfig::from_yaml("downstream:\n  api_base: https://openrouter.ai/api/v1\n")
                .expect("parse");
        let client = OpenAiClient::new("sk-test", &config.downstream).expect("client");
        assert_eq!(
            client.endpoint().as_str(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[test]
    fn structured_error_body_is_parsed() {
        let err = parse_error_body(
            429,
            r#"{"error":{"message":"You exceeded your quota","type":"insufficient_quota","code":"insufficient_quota"}}"#,
        );
        match err {
            DownstreamError::Api {
                status,
                code,
                kind,
                message,
            } => {
                assert_eq!(status, 429);
                assert_eq!(code.as_deref(), Some("insufficient_quota"));
                assert_eq!(kind.as_deref(), Some("insufficient_quota"));
                assert_eq!(message, "You exceeded your quota");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn unstructured_error_body_is_kept_as_message() {
        match parse_error_body(502, "Bad Gateway") {
            DownstreamError::Api { code, message, .. } => {
                assert!(code.is_none());
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected: {other:?}"),
        }
        match parse_error_body(500, "") {
            DownstreamError::Api { message, .. } => assert_eq!(message, "HTTP 500"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
