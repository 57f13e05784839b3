//! API server configuration.

use relay_core::config::{Environment, RelayConfig};

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "0.0.0.0:3000").
    pub bind_addr: String,
    /// Deployment environment.
    pub environment: Environment,
    /// Downstream API credential. Blank counts as absent.
    pub api_key: Option<String>,
    /// System instruction, generation parameters and limits.
    pub relay: RelayConfig,
}
