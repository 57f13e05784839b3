pub mod formats;

use flexi_logger::Logger;

use crate::Error;

/// Maps `-v` repetitions to a default filter; `RUST_LOG` still wins.
fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "warn,relay_cli=info,relay_client=info",
        2 => "info,relay_cli=debug,relay_client=debug",
        _ => "debug,relay_cli=trace,relay_client=trace",
    }
}

/// Logs go to stderr; stdout carries the transcript.
pub fn init(verbose: u8) -> Result<(), Error> {
    Logger::try_with_env_or_str(default_filter(verbose))?
        .format(formats::cli_format)
        .log_to_stderr()
        .start()?;

    Ok(())
}
