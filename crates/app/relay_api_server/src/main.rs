//! Chat relay server binary.
//!
//! Reads the downstream credential, port and environment from flags or the
//! environment (a `.env` file is honoured), loads the optional relay config
//! file and serves the API until Ctrl-C.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use relay_api::AppState;
use relay_api::config::ApiConfig;
use relay_core::config::{Environment, RelayConfig};
use tracing::{error, info, warn};

/// CLI arguments for the relay server.
#[derive(Parser, Debug)]
#[command(name = "relay_api_server", about = "Chat relay HTTP server")]
struct Args {
    /// Port to listen on (0 = ephemeral).
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Interface to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Deployment environment; `production` hides diagnostic detail.
    #[arg(long, env = "RELAY_ENV", default_value = "development")]
    environment: String,

    /// Downstream API key. Without it the relay runs but reports `configured: false`.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// YAML file with the system prompt and generation parameters.
    #[arg(long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,relay_api=debug,relay_core=debug,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let environment: Environment = args.environment.parse().unwrap_or_default();

    let relay = RelayConfig::load(args.config.as_deref())?;
    info!(
        config = ?args.config,
        model = %relay.generation.model,
        max_message_length = relay.max_message_length,
        "relay configuration loaded"
    );

    let config = ApiConfig {
        bind_addr: format!("{}:{}", args.host, args.port),
        environment,
        api_key: args.api_key,
        relay,
    };

    let state = AppState::from_config(config.clone())?;
    if !state.is_configured() {
        warn!("OPENAI_API_KEY is not set; /api/chat will answer 500 until it is configured");
    }

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!(
        addr = %local_addr,
        environment = %environment,
        configured = state.is_configured(),
        "chat relay listening"
    );

    axum::serve(listener, relay_api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("chat relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
