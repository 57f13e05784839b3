//! Integration tests: build the router with a scripted downstream client and
//! drive it with `oneshot`.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use relay_api::AppState;
use relay_core::config::{Environment, GenerationParams, RelayConfig};
use relay_core::downstream::{CompletionClient, DownstreamError};
use serde_json::{Value, json};
use tower::ServiceExt;

/// Downstream stand-in with a fixed behaviour.
enum Scripted {
    Reply(&'static str),
    Fail(DownstreamError),
    Panic,
}

struct ScriptedClient {
    behaviour: Scripted,
    calls: AtomicUsize,
    last_user: std::sync::Mutex<Option<String>>,
}

impl ScriptedClient {
    fn new(behaviour: Scripted) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: AtomicUsize::new(0),
            last_user: std::sync::Mutex::new(None),
        })
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        _params: &GenerationParams,
    ) -> Result<String, DownstreamError> {
        assert!(!system.is_empty());
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_user.lock().expect("lock") = Some(user.to_string());
        match &self.behaviour {
            Scripted::Reply(text) => Ok((*text).to_string()),
            Scripted::Fail(e) => Err(e.clone()),
            Scripted::Panic => panic!("downstream client exploded"),
        }
    }
}

fn app_with(client: Option<Arc<ScriptedClient>>, environment: Environment) -> axum::Router {
    let completion = client.map(|c| c as Arc<dyn CompletionClient>);
    relay_api::router(AppState::new(RelayConfig::default(), environment, completion))
}

async fn post_chat(app: axum::Router, body: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

async fn send(app: axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.expect("request");
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn api_error(status: u16, code: &str) -> DownstreamError {
    DownstreamError::Api {
        status,
        code: Some(code.into()),
        kind: None,
        message: "provider says no".into(),
    }
}

#[tokio::test]
async fn relays_reply_and_echoes_session() {
    let client = ScriptedClient::new(Scripted::Reply("We offer several data bundles."));
    let app = app_with(Some(client.clone()), Environment::Test);

    let (status, json) = post_chat(
        app,
        r#"{"message":"What are the current data plans for Karachi?","sessionId":"s1"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reply"], "We offer several data bundles.");
    assert_eq!(json["sources"], json!([]));
    assert_eq!(json["sessionId"], "s1");
    assert!(json["timestamp"].is_string());
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn forwards_trimmed_message_and_defaults_session() {
    let client = ScriptedClient::new(Scripted::Reply("hi"));
    let app = app_with(Some(client.clone()), Environment::Test);

    let (status, json) = post_chat(app, r#"{"message":"   hello there \n"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["sessionId"], "anonymous");
    assert_eq!(
        client.last_user.lock().expect("lock").as_deref(),
        Some("hello there")
    );
}

#[tokio::test]
async fn empty_message_is_validation_error() {
    let client = ScriptedClient::new(Scripted::Reply("unused"));
    let app = app_with(Some(client.clone()), Environment::Test);

    let (status, json) = post_chat(app, r#"{"message":""}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["error"],
        "Message is required and must be a non-empty string"
    );
    assert_eq!(json["code"], "validation");
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn padded_whitespace_is_validation_error() {
    let app = app_with(Some(ScriptedClient::new(Scripted::Reply("x"))), Environment::Test);
    let (status, json) = post_chat(app, r#"{"message":"     \t\n   "}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "validation");
}

#[tokio::test]
async fn malformed_json_is_validation_error() {
    let app = app_with(Some(ScriptedClient::new(Scripted::Reply("x"))), Environment::Test);
    let (status, json) = post_chat(app, "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["error"],
        "Message is required and must be a non-empty string"
    );
}

#[tokio::test]
async fn oversized_message_is_rejected() {
    let app = app_with(Some(ScriptedClient::new(Scripted::Reply("x"))), Environment::Test);
    let body = json!({ "message": "a".repeat(5000) }).to_string();

    let (status, json) = post_chat(app, &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "validation");
    assert!(json["error"].as_str().unwrap_or_default().contains("too long"));
}

#[tokio::test]
async fn message_at_exact_limit_succeeds() {
    let max = RelayConfig::default().max_message_length;
    let app = app_with(Some(ScriptedClient::new(Scripted::Reply("ok"))), Environment::Test);
    let body = json!({ "message": "a".repeat(max) }).to_string();

    let (status, _) = post_chat(app, &body).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn missing_credential_is_server_error() {
    let app = app_with(None, Environment::Test);

    let (status, json) = post_chat(app, r#"{"message":"hello"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "server_error");
    assert!(json["error"].as_str().unwrap_or_default().contains("not configured"));
}

#[tokio::test]
async fn validation_precedes_configuration_check() {
    let app = app_with(None, Environment::Test);
    let (status, json) = post_chat(app, r#"{"message":""}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "validation");
}

#[tokio::test]
async fn downstream_errors_map_to_taxonomy() {
    let cases = [
        (api_error(429, "insufficient_quota"), 429, "quota_exceeded"),
        (api_error(401, "invalid_api_key"), 401, "invalid_key"),
        (api_error(429, "rate_limit_exceeded"), 429, "rate_limit"),
        (api_error(400, "context_length_exceeded"), 400, "context_length"),
        (DownstreamError::Timeout, 408, "timeout"),
        (api_error(500, "something_else"), 500, "server_error"),
    ];

    for (error, expected_status, expected_code) in cases {
        let app = app_with(Some(ScriptedClient::new(Scripted::Fail(error))), Environment::Production);
        let (status, json) = post_chat(app, r#"{"message":"hello"}"#).await;
        assert_eq!(status.as_u16(), expected_status, "code {expected_code}");
        assert_eq!(json["code"], expected_code);
        assert!(json.get("details").is_none(), "no details in production");
        assert!(!json["error"].as_str().unwrap_or_default().contains("provider says no"));
    }
}

#[tokio::test]
async fn unmapped_error_carries_details_outside_production() {
    let client = ScriptedClient::new(Scripted::Fail(api_error(500, "mystery")));
    let app = app_with(Some(client), Environment::Development);

    let (status, json) = post_chat(app, r#"{"message":"hello"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["details"].as_str().unwrap_or_default().contains("provider says no"));
}

#[tokio::test]
async fn handler_panic_becomes_server_error() {
    let app = app_with(Some(ScriptedClient::new(Scripted::Panic)), Environment::Production);

    let (status, json) = post_chat(app, r#"{"message":"hello"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "server_error");
    assert!(json.get("details").is_none());
}
