//! Error types for media search functionality.

use std::fmt;

use mwb_core::ConfigError;
use thiserror::Error;

/// Which list a filter pattern came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// `--include` pattern
    Include,
    /// `--exclude` pattern
    Exclude,
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternKind::Include => f.write_str("include"),
            PatternKind::Exclude => f.write_str("exclude"),
        }
    }
}

/// Errors that can occur during media search operations.
#[derive(Debug, Error)]
pub enum MediaSearchError {
    /// A `>`/`<` token without a usable minute count.
    #[error("Malformed duration '{token}': expected >N or <N with N in whole minutes")]
    MalformedDuration {
        /// The offending token
        token: String,
    },

    /// A selector character with nothing to select.
    #[error("Empty selector '{token}': expected a value after the selector character")]
    EmptySelector {
        /// The offending token
        token: String,
    },

    /// A term with no word, selector or duration marker in it.
    #[error("Empty search term: expected words, selectors or duration markers")]
    EmptyTerm,

    /// A filter pattern that is not a valid regular expression.
    #[error("Invalid {kind} regex '{pattern}': {reason}")]
    InvalidPattern {
        /// Include or exclude list
        kind: PatternKind,
        /// The pattern as given
        pattern: String,
        /// Compiler diagnostic
        reason: String,
    },

    /// A numeric option outside its accepted range.
    #[error("Invalid value '{value}' for {name}: {reason}")]
    InvalidOption {
        /// Option name
        name: String,
        /// Value as given
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// Unsupported sort key, order or output mode.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// Search operation failed with the specified query and reason.
    #[error("Search failed for query '{query}': {reason}")]
    SearchFailed {
        /// The search query that failed
        query: String,
        /// The reason for the failure
        reason: String,
    },

    /// Network communication error occurred during search.
    #[error("Network error: {reason}")]
    NetworkError {
        /// The reason for the network error
        reason: String,
    },

    /// Failed to parse search results or response data.
    #[error("Parse error: {reason}")]
    ParseError {
        /// The reason for the parse error
        reason: String,
    },

    /// One term of a multi-term search failed, failing the whole search.
    #[error("Search term #{index} '{term}' failed")]
    TermFailed {
        /// The term as the user typed it
        term: String,
        /// 1-based position among the searched terms
        index: usize,
        /// Underlying upstream failure
        #[source]
        source: Box<MediaSearchError>,
    },
}

impl MediaSearchError {
    /// Checks if this error is due to user input validation.
    ///
    /// Such errors are raised before any request reaches the index.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            MediaSearchError::MalformedDuration { .. }
                | MediaSearchError::EmptySelector { .. }
                | MediaSearchError::EmptyTerm
                | MediaSearchError::InvalidPattern { .. }
                | MediaSearchError::InvalidOption { .. }
                | MediaSearchError::Configuration(_)
        )
    }

    /// Checks if this error came from the index or the way to it.
    pub fn is_upstream_error(&self) -> bool {
        match self {
            MediaSearchError::SearchFailed { .. }
            | MediaSearchError::NetworkError { .. }
            | MediaSearchError::ParseError { .. } => true,
            MediaSearchError::TermFailed { source, .. } => source.is_upstream_error(),
            _ => false,
        }
    }
}
