//! mwb CLI - Command-line interface
//!
//! Searches the MediathekViewWeb index of German public broadcasting content.

mod commands;
mod render;

use std::process::ExitCode;

use clap::{ArgAction, Parser};
use mwb_core::{CliLogLevel, MwbConfig, init_tracing};

/// Main CLI structure for mwb.
#[derive(Parser)]
#[command(name = "mwb")]
#[command(about = "MediathekViewWeb CLI - Search German public broadcasting content")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: commands::Commands,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Log level, overrides -v
    #[arg(long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

impl Cli {
    /// Explicit level first, then `-v`, then the configured level.
    fn console_level(&self, config: &MwbConfig) -> CliLogLevel {
        match (self.log_level, self.verbose, config.logging.level) {
            (Some(level), _, _) => level,
            (None, 0, Some(level)) => level,
            (None, count, _) => CliLogLevel::from_verbosity(count),
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = MwbConfig::from_env()?;
    let level = cli.console_level(&config);
    init_tracing(level.as_tracing_level(), config.logging.logs_dir.as_deref())?;

    commands::handle_command(cli.command, &config, cli.verbose > 0).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
