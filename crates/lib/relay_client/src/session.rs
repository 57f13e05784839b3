//! Chat session state machine.
//!
//! Per message: `idle → sending → (success | retryable error | fatal error) → idle`.
//! At most one chat request is in flight per session; a submit while
//! sending is rejected, not queued. State lives behind a mutex that is never
//! held across an await, so a [`HealthMonitor`](crate::HealthMonitor) can
//! update the connection indicator while a message is in flight.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use relay_core::models::ChatRequest;
use relay_core::taxonomy::ErrorCode;
use tracing::{debug, info, warn};

use crate::composer::{self, ComposerView};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::health::HealthMonitor;
use crate::message::{ChatMessage, Transcript};
use crate::session_id::SessionId;
use crate::transport::{HttpTransport, RelayTransport};

pub const CLEAR_QUESTION: &str = "Are you sure you want to clear the chat history?";

/// Asks the user a yes/no question (resend, clear).
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, question: &str) -> bool;
}

/// Mutable state of one chat window.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub transcript: Transcript,
    pub is_loading: bool,
    pub retry_count: u32,
    pub connection_online: bool,
    /// Dismissible error banner.
    pub banner: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            transcript: Transcript::default(),
            is_loading: false,
            retry_count: 0,
            connection_online: true,
            banner: None,
        }
    }
}

/// Point-in-time copy of the session state for rendering.
pub type SessionSnapshot = SessionState;

/// Why a submit was not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Empty,
    TooLong,
    /// A request is already in flight.
    Busy,
}

/// Result of one submit.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Rejected(RejectReason),
    /// The assistant message appended to the transcript.
    Delivered(ChatMessage),
    /// The error already recorded in the transcript and banner.
    Failed(ClientError),
}

pub(crate) fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Clears `is_loading` even if the submitting future is dropped mid-flight.
struct InFlight<'a>(&'a Mutex<SessionState>);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(self.0).is_loading = false;
    }
}

/// Text shown in the transcript and banner for a failure.
pub fn describe_error(err: &ClientError) -> String {
    let server_text = || {
        if err.message.trim().is_empty() {
            err.code.user_message().to_string()
        } else {
            err.message.clone()
        }
    };
    match err.code {
        ErrorCode::Timeout | ErrorCode::Network => err.code.user_message().to_string(),
        ErrorCode::Validation
        | ErrorCode::QuotaExceeded
        | ErrorCode::InvalidKey
        | ErrorCode::RateLimit
        | ErrorCode::ContextLength
        | ErrorCode::ServerError => server_text(),
    }
}

/// One chat window: transcript, loading flag, retry counter and connection
/// indicator, bound to a transport.
pub struct ChatSession<T> {
    id: SessionId,
    config: ClientConfig,
    transport: Arc<T>,
    state: Arc<Mutex<SessionState>>,
}

impl<T> Clone for ChatSession<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            config: self.config.clone(),
            transport: Arc::clone(&self.transport),
            state: Arc::clone(&self.state),
        }
    }
}

impl ChatSession<HttpTransport> {
    /// Session talking HTTP to `config.base_url`.
    pub fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(&config.base_url)?;
        Ok(Self::new(transport, config))
    }
}

impl<T: RelayTransport + 'static> ChatSession<T> {
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self::with_id(transport, config, SessionId::generate())
    }

    pub fn with_id(transport: T, config: ClientConfig, id: SessionId) -> Self {
        Self {
            id,
            config,
            transport: Arc::new(transport),
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        lock(&self.state).clone()
    }

    /// Counter and send affordance for the current draft.
    pub fn compose(&self, draft: &str) -> ComposerView {
        let sending = lock(&self.state).is_loading;
        composer::evaluate(draft, self.config.max_message_length, sending)
    }

    pub fn dismiss_banner(&self) {
        lock(&self.state).banner = None;
    }

    /// Connection monitor sharing this session's indicator.
    pub fn health_monitor(&self) -> HealthMonitor<T> {
        HealthMonitor::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.state),
            self.config.health_interval,
            self.config.health_timeout,
        )
    }

    /// Sends one message without retry.
    ///
    /// The user message is appended before the request goes out. The request
    /// is abandoned at `request_timeout`; a late response is dropped with it.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let content = text.trim();
        let view = self.compose(content);
        if view.char_count == 0 {
            return SubmitOutcome::Rejected(RejectReason::Empty);
        }
        if view.over_limit {
            return SubmitOutcome::Rejected(RejectReason::TooLong);
        }

        {
            let mut state = lock(&self.state);
            if state.is_loading {
                debug!(session_id = %self.id, "submit ignored, request in flight");
                return SubmitOutcome::Rejected(RejectReason::Busy);
            }
            state.is_loading = true;
            state.banner = None;
            state.transcript.push(ChatMessage::user(content));
        }
        let _in_flight = InFlight(&self.state);

        let request = ChatRequest {
            message: content.to_string(),
            session_id: Some(self.id.to_string()),
        };
        debug!(session_id = %self.id, len = content.chars().count(), "sending chat message");

        let result =
            match tokio::time::timeout(self.config.request_timeout, self.transport.send_chat(&request))
                .await
            {
                Ok(result) => result,
                Err(_elapsed) => Err(ClientError::timeout()),
            };

        let mut state = lock(&self.state);
        match result {
            Ok(resp) => {
                let message = ChatMessage::assistant(resp.reply, resp.sources);
                state.transcript.push(message.clone());
                state.retry_count = 0;
                info!(session_id = %self.id, "reply received");
                SubmitOutcome::Delivered(message)
            }
            Err(err) => {
                let text = describe_error(&err);
                warn!(session_id = %self.id, code = %err.code, error = %err, "chat request failed");
                state.transcript.push(ChatMessage::error(text.clone()));
                state.banner = Some(text);
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Sends a message, offering to resend the identical text after a
    /// retryable failure until the retry counter reaches `max_retries`.
    pub async fn send(&self, text: &str, confirm: &dyn Confirm) -> SubmitOutcome {
        let mut outcome = self.submit(text).await;
        loop {
            let SubmitOutcome::Failed(err) = &outcome else {
                return outcome;
            };
            if !err.is_retryable() {
                return outcome;
            }

            let attempt = {
                let mut state = lock(&self.state);
                if state.retry_count >= self.config.max_retries {
                    debug!(session_id = %self.id, "retries exhausted");
                    return outcome;
                }
                state.retry_count += 1;
                state.retry_count
            };

            tokio::time::sleep(self.config.retry_delay).await;

            let question = format!(
                "{}\n\nWould you like to retry? (Attempt {attempt} of {})",
                describe_error(err),
                self.config.max_retries
            );
            if !confirm.confirm(&question).await {
                return outcome;
            }
            info!(session_id = %self.id, attempt, "resending message");
            outcome = self.submit(text).await;
        }
    }

    /// Clears the transcript and retry counter after confirmation. An empty
    /// transcript is left alone without asking. Returns whether anything was
    /// cleared.
    pub async fn clear(&self, confirm: &dyn Confirm) -> bool {
        if lock(&self.state).transcript.is_empty() {
            return false;
        }
        if !confirm.confirm(CLEAR_QUESTION).await {
            return false;
        }
        let mut state = lock(&self.state);
        state.transcript.clear();
        state.retry_count = 0;
        state.banner = None;
        info!(session_id = %self.id, "transcript cleared");
        true
    }
}
