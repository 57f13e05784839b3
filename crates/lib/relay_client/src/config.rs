//! Client configuration.

use std::time::Duration;

use relay_core::config::DEFAULT_MAX_MESSAGE_LENGTH;
use url::Url;

/// Tunables for one chat session.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Relay base URL; `api/chat` and `api/health` resolve against it.
    pub base_url: Url,
    pub max_message_length: usize,
    /// Deadline for one chat request.
    pub request_timeout: Duration,
    /// Resend prompts offered for retryable failures before a success resets the count.
    pub max_retries: u32,
    /// Pause before asking whether to resend.
    pub retry_delay: Duration,
    pub health_interval: Duration,
    pub health_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("http://localhost:3000/").expect("static URL is valid"),
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            health_interval: Duration::from_secs(30),
            health_timeout: Duration::from_secs(5),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }
}
