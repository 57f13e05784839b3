//! # relay_api
//!
//! HTTP API library for the chat relay.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::routing::{get, post};
use relay_core::config::{Environment, RelayConfig};
use relay_core::downstream::openai::OpenAiClient;
use relay_core::downstream::{CompletionClient, DownstreamError};
use relay_core::models::EndpointInfo;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{chat, health, index, not_found};

/// Route paths.
pub mod routes {
    pub const GET_INDEX: &str = "/";
    pub const GET_API_HEALTH: &str = "/api/health";
    pub const POST_API_CHAT: &str = "/api/chat";
}

/// Routes advertised by `GET /` and the 404 fallback.
pub const ENDPOINTS: [(&str, &str, &str); 3] = [
    ("GET", routes::GET_INDEX, "API information"),
    ("GET", routes::GET_API_HEALTH, "Service health and configuration status"),
    ("POST", routes::POST_API_CHAT, "Send a chat message"),
];

/// `ENDPOINTS` as structured entries.
pub fn endpoint_infos() -> Vec<EndpointInfo> {
    ENDPOINTS
        .iter()
        .map(|(method, path, description)| EndpointInfo {
            method: (*method).to_string(),
            path: (*path).to_string(),
            description: (*description).to_string(),
        })
        .collect()
}

/// Shared application state passed to all handlers.
///
/// Read-only after startup; requests share nothing else.
#[derive(Clone)]
pub struct AppState {
    /// System instruction, generation parameters and limits.
    pub config: Arc<RelayConfig>,
    /// Deployment environment.
    pub environment: Environment,
    /// Downstream client. `None` when no credential was supplied.
    pub completion: Option<Arc<dyn CompletionClient>>,
    /// Process start, for `uptime`.
    pub started_at: Instant,
}

impl AppState {
    /// Builds state from API configuration, creating the OpenAI client when a
    /// credential is present.
    pub fn from_config(config: ApiConfig) -> Result<Self, DownstreamError> {
        let completion = match config.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => {
                let client = OpenAiClient::new(key, &config.relay.downstream)?;
                Some(Arc::new(client) as Arc<dyn CompletionClient>)
            }
            _ => None,
        };
        Ok(Self::new(config.relay, config.environment, completion))
    }

    pub fn new(
        config: RelayConfig,
        environment: Environment,
        completion: Option<Arc<dyn CompletionClient>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            environment,
            completion,
            started_at: Instant::now(),
        }
    }

    /// Whether a downstream credential is configured.
    pub fn is_configured(&self) -> bool {
        self.completion.is_some()
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let expose_details = state.environment.exposes_details();

    Router::new()
        .route(routes::GET_INDEX, get(index::index_handler))
        .route(routes::GET_API_HEALTH, get(health::health_handler))
        .route(routes::POST_API_CHAT, post(chat::chat_handler))
        .fallback(not_found::not_found_handler)
        .method_not_allowed_fallback(not_found::not_found_handler)
        .layer(CatchPanicLayer::custom(move |panic| {
            middleware::panic::panic_response(panic, expose_details)
        }))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
