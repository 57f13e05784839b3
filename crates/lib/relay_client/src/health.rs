//! Connection-health polling.
//!
//! Runs beside the message flow and only touches the connection indicator
//! (and the offline banner), never the transcript.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::session::{SessionState, lock};
use crate::transport::RelayTransport;

/// Banner raised when the platform reports the network is gone.
pub const OFFLINE_NOTICE: &str = "You appear to be offline. Messages will not be sent until the connection returns.";

/// Platform connectivity signals that trigger an immediate reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    /// The chat window became visible again.
    VisibilityRegained,
    Online,
    Offline,
}

/// Polls the relay health endpoint and maintains the connection indicator.
pub struct HealthMonitor<T> {
    transport: Arc<T>,
    state: Arc<Mutex<SessionState>>,
    interval: Duration,
    timeout: Duration,
}

impl<T: RelayTransport> HealthMonitor<T> {
    pub(crate) fn new(
        transport: Arc<T>,
        state: Arc<Mutex<SessionState>>,
        interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            state,
            interval,
            timeout,
        }
    }

    /// One health check; updates and returns the indicator.
    pub async fn check(&self) -> bool {
        let online = matches!(
            tokio::time::timeout(self.timeout, self.transport.health()).await,
            Ok(Ok(_))
        );
        let mut state = lock(&self.state);
        if state.connection_online != online {
            info!(online, "connection status changed");
        }
        state.connection_online = online;
        if online && state.banner.as_deref() == Some(OFFLINE_NOTICE) {
            state.banner = None;
        }
        online
    }

    /// Marks the connection down without waiting for a poll.
    pub fn mark_offline(&self) {
        let mut state = lock(&self.state);
        state.connection_online = false;
        state.banner = Some(OFFLINE_NOTICE.to_string());
        info!("network reported offline");
    }

    /// Checks immediately, then on every interval tick and on
    /// visibility/online events, until `shutdown` is cancelled.
    pub async fn run(self, mut events: mpsc::Receiver<ConnectivityEvent>, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut events_open = true;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.check().await;
                }
                event = events.recv(), if events_open => match event {
                    Some(ConnectivityEvent::VisibilityRegained | ConnectivityEvent::Online) => {
                        self.check().await;
                    }
                    Some(ConnectivityEvent::Offline) => self.mark_offline(),
                    None => events_open = false,
                },
            }
        }
        debug!("health monitor stopped");
    }
}
