//! Transport to the relay.

use async_trait::async_trait;
use relay_core::config::join_under;
use relay_core::models::{ChatRequest, ChatResponse, HealthResponse};
use relay_core::taxonomy::ErrorCode;
use reqwest::{Client, Response};
use tracing::debug;
use url::Url;

use crate::error::ClientError;

/// The two relay operations the client uses.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError>;

    async fn health(&self) -> Result<HealthResponse, ClientError>;
}

/// reqwest-backed transport. Deadlines are applied by the caller.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    chat_url: Url,
    health_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: &Url) -> Result<Self, ClientError> {
        let join = |path: &str| {
            join_under(base_url, path)
                .map_err(|e| ClientError::new(ErrorCode::Validation, format!("Invalid relay URL: {e}")))
        };
        Ok(Self {
            http: Client::new(),
            chat_url: join("api/chat")?,
            health_url: join("api/health")?,
        })
    }

    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }
}

fn transport_error(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::timeout()
    } else {
        ClientError::network(e.to_string())
    }
}

/// Returns the body of a 2xx response, or the classified error.
async fn read_body(resp: Response) -> Result<Vec<u8>, ClientError> {
    let status = resp.status();
    let bytes = resp.bytes().await.map_err(transport_error)?;
    if !status.is_success() {
        debug!(status = status.as_u16(), "relay returned an error status");
        return Err(ClientError::from_response(status.as_u16(), &bytes));
    }
    Ok(bytes.to_vec())
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, ClientError> {
    serde_json::from_slice(bytes).map_err(|e| {
        let body = serde_json::from_slice::<serde_json::Value>(bytes).ok();
        debug!(error = %e, body = ?body, "unexpected relay body");
        ClientError::new(ErrorCode::ServerError, "Invalid response from server")
    })
}

#[async_trait]
impl RelayTransport for HttpTransport {
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        let resp = self
            .http
            .post(self.chat_url.clone())
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;
        decode(&read_body(resp).await?)
    }

    async fn health(&self) -> Result<HealthResponse, ClientError> {
        let resp = self
            .http
            .get(self.health_url.clone())
            .send()
            .await
            .map_err(transport_error)?;
        decode(&read_body(resp).await?)
    }
}
