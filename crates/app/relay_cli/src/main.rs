// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use clap::Parser;
use cli::{Cli, Commands};
use relay_client::{ChatSession, HttpTransport, RelayTransport};

mod cli;
mod logging;
mod repl;
mod terminal;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = run().await {
        log::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    let args = Cli::parse();
    logging::init(args.verbose)?;

    match &args.command {
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        }
        Commands::Health => {
            let transport = HttpTransport::new(&args.url)?;
            match transport.health().await {
                Ok(health) => println!(
                    "online: {} (environment {}, version {}, configured {}, uptime {:.0}s)",
                    args.url, health.environment, health.version, health.configured, health.uptime
                ),
                Err(e) => {
                    println!("offline: {}", args.url);
                    return Err(e.into());
                }
            }
        }
        Commands::Chat { .. } => {
            let session = ChatSession::connect(args.client_config())?;
            repl::run(session).await?;
        }
    }

    Ok(())
}
