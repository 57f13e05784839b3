//! Wire entities exchanged between the chat client and the relay.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session identifier used when the client supplies none.
pub const ANONYMOUS_SESSION: &str = "anonymous";

/// `POST /api/chat` request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// `POST /api/chat` success body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub reply: String,
    #[serde(default)]
    pub sources: Vec<String>,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
}

/// `GET /api/health` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    /// Seconds since the relay started.
    pub uptime: f64,
    pub environment: String,
    /// Whether a downstream credential is present.
    pub configured: bool,
    pub version: String,
}

/// One route advertised by the index and the 404 fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointInfo {
    pub method: String,
    pub path: String,
    pub description: String,
}

/// `GET /` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiIndex {
    pub name: String,
    pub version: String,
    pub endpoints: Vec<EndpointInfo>,
}

/// Body for unmatched routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotFoundResponse {
    pub error: String,
    pub path: String,
    pub method: String,
    pub available_endpoints: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_uses_camel_case() {
        let req: ChatRequest =
            serde_json::from_str(r#"{"message":"hi","sessionId":"s1"}"#).expect("parse");
        assert_eq!(req.session_id.as_deref(), Some("s1"));

        let json = serde_json::to_value(ChatRequest {
            message: "hi".into(),
            session_id: None,
        })
        .expect("serialize");
        assert_eq!(json, serde_json::json!({"message": "hi"}));
    }

    #[test]
    fn chat_response_defaults_missing_sources() {
        let resp: ChatResponse = serde_json::from_str(
            r#"{"reply":"ok","sessionId":"s1","timestamp":"2026-01-01T00:00:00Z"}"#,
        )
        .expect("parse");
        assert!(resp.sources.is_empty());
        assert_eq!(resp.session_id, "s1");
    }

    #[test]
    fn not_found_keeps_snake_case_endpoint_list() {
        let body = NotFoundResponse {
            error: "Endpoint not found".into(),
            path: "/nope".into(),
            method: "GET".into(),
            available_endpoints: vec!["GET /api/health".into()],
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert!(json.get("available_endpoints").is_some());
    }
}
