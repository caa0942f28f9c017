//! Tracing setup for mwb
//!
//! Console logs go to stderr so they never interleave with rendered results
//! on stdout. When a log directory is configured, a second layer writes the
//! complete trace of the run to disk.

use std::fs::{File, create_dir_all};
use std::path::Path;

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// File name of the trace log, overwritten on every run.
pub const LOG_FILE_NAME: &str = "mwb-last-run.log";

/// Initialize tracing with a console layer and an optional trace file.
///
/// # Arguments
/// * `console_level` - Log level for stderr output (what the user sees)
/// * `logs_dir` - Directory for the full trace log; `None` disables the file layer
///
/// `RUST_LOG` takes precedence over `console_level` when set.
///
/// # Errors
///
/// - `std::io::Error` - If the logs directory cannot be created or the log file
///   cannot be opened for writing
pub fn init_tracing(console_level: Level, logs_dir: Option<&Path>) -> std::io::Result<()> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console_level.to_string()));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let file_layer = match logs_dir {
        Some(dir) => {
            create_dir_all(dir)?;
            let log_file = File::create(dir.join(LOG_FILE_NAME))?;

            Some(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(false)
                    .with_writer(log_file)
                    .with_filter(EnvFilter::new("trace")),
            )
        }
        None => None,
    };

    // try_init: a second initialization (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init();

    tracing::debug!(
        console = %console_level,
        trace_file = ?logs_dir.map(|d| d.join(LOG_FILE_NAME)),
        "Tracing initialized"
    );

    Ok(())
}

/// CLI log levels for user control
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliLogLevel {
    /// Only error messages
    Error,
    /// Warning and error messages
    Warn,
    /// Informational, warning, and error messages
    Info,
    /// Debug, informational, warning, and error messages
    Debug,
    /// All messages including detailed tracing
    Trace,
}

impl CliLogLevel {
    /// Converts CLI log level to tracing Level enum.
    ///
    /// # Examples
    /// ```
    /// use mwb_core::tracing_setup::CliLogLevel;
    ///
    /// let level = CliLogLevel::Info.as_tracing_level();
    /// assert_eq!(level, tracing::Level::INFO);
    /// ```
    pub fn as_tracing_level(self) -> Level {
        match self {
            CliLogLevel::Error => Level::ERROR,
            CliLogLevel::Warn => Level::WARN,
            CliLogLevel::Info => Level::INFO,
            CliLogLevel::Debug => Level::DEBUG,
            CliLogLevel::Trace => Level::TRACE,
        }
    }

    /// Maps a repeated `-v` count to a level: none warns, one informs, more debugs.
    pub fn from_verbosity(count: u8) -> Self {
        match count {
            0 => CliLogLevel::Warn,
            1 => CliLogLevel::Info,
            _ => CliLogLevel::Debug,
        }
    }
}

impl std::str::FromStr for CliLogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(CliLogLevel::Error),
            "warn" => Ok(CliLogLevel::Warn),
            "info" => Ok(CliLogLevel::Info),
            "debug" => Ok(CliLogLevel::Debug),
            "trace" => Ok(CliLogLevel::Trace),
            _ => Err(format!("Invalid log level: {s}")),
        }
    }
}

impl std::fmt::Display for CliLogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliLogLevel::Error => write!(f, "error"),
            CliLogLevel::Warn => write!(f, "warn"),
            CliLogLevel::Info => write!(f, "info"),
            CliLogLevel::Debug => write!(f, "debug"),
            CliLogLevel::Trace => write!(f, "trace"),
        }
    }
}
