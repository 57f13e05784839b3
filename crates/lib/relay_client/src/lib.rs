//! # relay_client
//!
//! Client side of the chat relay. A [`ChatSession`] owns the transcript,
//! the loading flag, the retry counter and the connection indicator for one
//! chat window; several sessions can live in one process.
//!
//! # Public API
//!
//! - [`ChatSession::submit`]: send one message, no retry
//! - [`ChatSession::send`]: send with the bounded confirm-and-resend loop
//! - [`ChatSession::clear`]: clear the transcript after confirmation
//! - [`HealthMonitor::run`]: connection-health polling

pub mod composer;
pub mod config;
pub mod error;
pub mod health;
pub mod message;
pub mod session;
pub mod session_id;
pub mod transport;

pub use composer::ComposerView;
pub use config::ClientConfig;
pub use error::ClientError;
pub use health::{ConnectivityEvent, HealthMonitor};
pub use message::{ChatMessage, Role, Transcript};
pub use session::{ChatSession, Confirm, RejectReason, SessionSnapshot, SubmitOutcome};
pub use session_id::SessionId;
pub use transport::{HttpTransport, RelayTransport};
