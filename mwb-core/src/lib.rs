//! mwb Core - configuration and runtime plumbing
//!
//! Holds the per-invocation configuration record and the tracing setup shared
//! by the search library and the command-line front end.

pub mod config;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::{ApiConfig, LoggingConfig, MwbConfig, SearchDefaults, SortKey, SortOrder};
pub use tracing_setup::{CliLogLevel, init_tracing};

/// Configuration errors, detected before any search runs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unsupported sort key '{key}' (expected timestamp, duration or channel)")]
    UnsupportedSortKey { key: String },

    #[error("Unsupported sort order '{order}' (expected asc or desc)")]
    UnsupportedSortOrder { order: String },

    #[error("Unsupported output mode '{mode}'")]
    UnsupportedOutputMode { mode: String },

    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Invalid value '{value}' for {variable}: {reason}")]
    InvalidOverride {
        variable: String,
        value: String,
        reason: String,
    },
}
