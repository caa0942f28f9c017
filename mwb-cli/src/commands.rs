//! CLI command implementations

use std::io::{self, Write};

use anyhow::Context;
use clap::{Args, Subcommand};
use mwb_core::{MwbConfig, SortKey, SortOrder};
use mwb_search::{Outcome, SearchOptions, SearchService, collect_duration_bounds};

use crate::render::{self, OutputMode};

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Search for content
    Search(SearchArgs),
    /// List available channels
    Channels,
}

/// Arguments of `mwb search`.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search terms; each term runs as its own search and results are merged.
    /// Supports MediathekView syntax: !channel #topic +title *description >min <min
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Drop results matching this regex (repeatable)
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Keep only results matching any of these regexes (repeatable)
    #[arg(short, long)]
    pub include: Vec<String>,

    /// Maximum number of results
    #[arg(short, long)]
    pub size: Option<usize>,

    /// Number of results to skip
    #[arg(short, long)]
    pub offset: Option<usize>,

    /// Sort by field (timestamp, duration, channel)
    #[arg(short = 'b', long)]
    pub sort_by: Option<String>,

    /// Sort order (asc or desc)
    #[arg(short = 'r', long)]
    pub sort_order: Option<String>,

    /// Exclude broadcasts scheduled in the future
    #[arg(long = "no-future")]
    pub no_future: bool,

    /// Print only the number of matching results
    #[arg(short, long)]
    pub count: bool,

    /// Output format (table, json, csv, oneline, onelinetheme, m3u, xspf)
    #[arg(short = 'f', long, default_value = "table")]
    pub format: String,
}

impl SearchArgs {
    /// Resolves the arguments against the configured defaults.
    ///
    /// # Errors
    /// - `ConfigError` - unknown sort key, sort order or output format
    pub fn resolve(
        &self,
        config: &MwbConfig,
        report_progress: bool,
    ) -> anyhow::Result<(SearchOptions, OutputMode)> {
        let defaults = &config.search;
        let mode: OutputMode = self.format.parse()?;

        let options = SearchOptions {
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            size: self.size.unwrap_or(defaults.size),
            offset: self.offset.unwrap_or(defaults.offset),
            sort_key: match &self.sort_by {
                Some(key) => key.parse::<SortKey>()?,
                None => defaults.sort_key,
            },
            sort_order: match &self.sort_order {
                Some(order) => order.parse::<SortOrder>()?,
                None => defaults.sort_order,
            },
            include_future: defaults.include_future && !self.no_future,
            count_only: self.count,
            report_progress,
        };

        Ok((options, mode))
    }
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn handle_command(
    command: Commands,
    config: &MwbConfig,
    report_progress: bool,
) -> anyhow::Result<()> {
    match command {
        Commands::Search(args) => search(&args, config, report_progress).await,
        Commands::Channels => list_channels(config).await,
    }
}

/// Run a search and render its outcome.
///
/// # Errors
/// - Invalid options or terms, before any request is issued
/// - Upstream failures of any term
/// - Writing the output or playlist failed
pub async fn search(
    args: &SearchArgs,
    config: &MwbConfig,
    report_progress: bool,
) -> anyhow::Result<()> {
    let (options, mode) = args.resolve(config, report_progress)?;
    let service = SearchService::from_config(config)?;

    tracing::info!(terms = ?args.query, format = %mode, "Starting search");

    match service.run(&args.query, &options).await? {
        Outcome::Count(count) => println!("{count}"),
        Outcome::Items(items) => match mode.playlist() {
            Some(format) => {
                let bounds = collect_duration_bounds(&args.query)?;
                let dir = std::env::current_dir().context("Cannot determine current directory")?;
                let path = render::save_playlist(&dir, &args.query, &bounds, format, &items)
                    .with_context(|| format!("Failed to write {format} playlist"))?;
                println!("{}", path.display());
            }
            None => {
                let mut out = io::stdout().lock();
                render::render(&mut out, &items, mode)?;
                out.flush()?;
            }
        },
    }

    Ok(())
}

/// List channel names known to the index.
///
/// # Errors
/// - Upstream failure of the channel probe
/// - Writing the output failed
pub async fn list_channels(config: &MwbConfig) -> anyhow::Result<()> {
    let service = SearchService::from_config(config)?;
    let channels = service
        .list_channels()
        .await
        .context("Failed to list channels")?;

    let mut out = io::stdout().lock();
    render::write_channels(&mut out, &channels)?;
    out.flush()?;
    Ok(())
}
