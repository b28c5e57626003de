mod cli;
mod config;

use clap::Parser;
use cli::{Cli, Commands};
use std::process::ExitCode;
use swapmatch_core::{ErrorKind, SwapError};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Logs go to stderr; stdout carries JSON output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            exit_code(&e)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Request(cmd) => cli::request::run(cmd, cli),
        Commands::Matches(cmd) => cli::matches::run(cmd, cli),
        Commands::Interest(cmd) => cli::interest::run(cmd, cli),
        Commands::Stats => cli::stats::run(cli),
        Commands::Config(cmd) => cli::config_cmd::run(cmd, &cli.config, cli.data_dir.clone()),
    }
}

/// Distinct exit status per engine error kind.
fn exit_code(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<SwapError>().map(SwapError::kind) {
        Some(ErrorKind::Validation) => ExitCode::from(2),
        Some(ErrorKind::Conflict) => ExitCode::from(3),
        Some(ErrorKind::NotFound) => ExitCode::from(4),
        Some(ErrorKind::Store) | Some(ErrorKind::Internal) | None => ExitCode::FAILURE,
    }
}
