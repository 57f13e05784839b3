use std::time::Duration;

use clap::{Parser, Subcommand};
use relay_client::ClientConfig;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "relay_cli", version, about = "Terminal chat client for the chat relay")]
pub struct Cli {
    /// Relay base URL.
    #[arg(long, global = true, env = "RELAY_URL", default_value = "http://localhost:3000/")]
    pub url: Url,

    /// Raise log verbosity (repeatable).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat session.
    Chat {
        /// Seconds before a chat request is abandoned.
        #[arg(long, default_value_t = 30)]
        timeout: u64,

        /// Resend prompts offered for a failing message.
        #[arg(long, default_value_t = 3)]
        max_retries: u32,

        /// Seconds between connection checks.
        #[arg(long, default_value_t = 30)]
        health_interval: u64,
    },
    /// Check whether the relay is reachable and configured.
    Health,
    /// Print the version.
    Version,
}

impl Cli {
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::default().with_base_url(self.url.clone());
        if let Commands::Chat {
            timeout,
            max_retries,
            health_interval,
        } = self.command
        {
            config.request_timeout = Duration::from_secs(timeout);
            config.max_retries = max_retries;
            config.health_interval = Duration::from_secs(health_interval.max(1));
        }
        config
    }
}
