//! Binary crate for the `weather` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Logging setup and mapping failures to exit codes

use std::process::ExitCode;

use clap::Parser;
use ipweather_core::{ErrorKind, WeatherError};

mod cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cmd = match cli::Cli::try_parse_from(cli::normalize_args(std::env::args_os())) {
        Ok(cmd) => cmd,
        Err(err) if err.kind() == clap::error::ErrorKind::ValueValidation => {
            eprint!("{}", cli::usage_error(&err));
            return ExitCode::from(2);
        }
        Err(err) => err.exit(),
    };
    init_logging(cmd.verbose);

    match cmd.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_status(&err))
        }
    }
}

fn init_logging(verbose: bool) {
    let env = env_logger::Env::default().default_filter_or(if verbose { "debug" } else { "warn" });
    env_logger::Builder::from_env(env).format_timestamp(None).init();
}

/// 2 for bad input, 1 for everything else.
fn exit_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<WeatherError>().map(WeatherError::kind) {
        Some(ErrorKind::InvalidArgument) => 2,
        _ => 1,
    }
}
