//! mwb Search - MediathekViewWeb query pipeline

#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]
//!
//! Turns selector-style query terms into structured index requests, runs
//! several of them as one search with URL deduplication, and post-filters,
//! sorts and windows the merged result set.

pub mod arrange;
pub mod errors;
pub mod filter;
pub mod multi_search;
pub mod playlist;
pub mod preprocess;
pub mod providers;
pub mod selector;
pub mod service;
pub mod types;

// Re-export main types
pub use arrange::{arrange, sort_items};
pub use errors::{MediaSearchError, PatternKind};
pub use filter::FilterSpec;
pub use multi_search::{MultiSearch, UnifiedResultSet, dedup_by_url};
pub use playlist::{PlaylistFormat, derive_filename, derive_filename_with_suffix};
pub use preprocess::{collect_duration_bounds, preprocess, preprocess_term};
pub use providers::{MediathekProvider, SearchProvider};
pub use selector::{ParsedTerm, SelectorToken, parse_term};
pub use service::{Outcome, SearchOptions, SearchService};
pub use types::{
    DurationBound, DurationBounds, DurationDirection, FieldConstraint, QueryOptions, ResultItem,
    SearchField, SearchRequest,
};

/// Convenience type alias for Results with MediaSearchError.
pub type Result<T> = std::result::Result<T, MediaSearchError>;
