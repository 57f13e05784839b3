//! Chat relay handler.
//!
//! `POST /api/chat`:
//! 1. Validates the message (present, text, non-empty when trimmed, within the limit)
//! 2. Requires a configured downstream credential
//! 3. Forwards the system instruction plus the trimmed message downstream
//! 4. Maps failures onto the error taxonomy

use std::time::{Duration, Instant};

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use chrono::Utc;
use relay_core::models::{ANONYMOUS_SESSION, ChatResponse};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::AppState;
use crate::error::{AppError, AppResult, MESSAGE_REQUIRED};

/// Returns the trimmed message, or the validation failure.
pub fn validate_message(message: Option<&Value>, max_length: usize) -> AppResult<&str> {
    let trimmed = message
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::Validation(MESSAGE_REQUIRED.into()))?;

    if trimmed.chars().count() > max_length {
        return Err(AppError::Validation(format!(
            "Message too long. Maximum {max_length} characters allowed."
        )));
    }
    Ok(trimmed)
}

/// Echoed correlation token; blank or missing becomes `"anonymous"`.
pub fn resolve_session_id(session_id: Option<&Value>) -> String {
    session_id
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(ANONYMOUS_SESSION)
        .to_string()
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// `POST /api/chat` — relay one message to the downstream model.
pub async fn chat_handler(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<ChatResponse>> {
    let started = Instant::now();

    let Json(body) = body.map_err(|rejection| {
        debug!(%rejection, "rejected chat body");
        AppError::Validation(MESSAGE_REQUIRED.into())
    })?;

    let message = validate_message(body.get("message"), state.config.max_message_length)?;
    let session_id = resolve_session_id(body.get("sessionId"));

    let Some(client) = state.completion.as_ref() else {
        error!("chat request received but no downstream credential is configured");
        return Err(AppError::NotConfigured);
    };

    info!(
        session_id = %session_id,
        message_len = message.chars().count(),
        "chat request"
    );

    let reply = client
        .complete(&state.config.system_prompt, message, &state.config.generation)
        .await
        .map_err(|e| {
            let code = e.error_code();
            warn!(
                session_id = %session_id,
                code = %code,
                error = %e,
                elapsed_ms = elapsed_ms(started.elapsed()),
                "downstream call failed"
            );
            AppError::downstream(e, state.environment.exposes_details())
        })?;

    info!(
        session_id = %session_id,
        reply_len = reply.chars().count(),
        elapsed_ms = elapsed_ms(started.elapsed()),
        "chat reply"
    );

    // Source attribution is not implemented; the list is always empty.
    Ok(Json(ChatResponse {
        reply,
        sources: Vec::new(),
        session_id,
        timestamp: Utc::now(),
    }))
}
