//! Integration tests for mwb
//!
//! Drive the complete search pipeline (preprocessing, multi-search, filters,
//! sort and window) against the scripted mock provider.

#[path = "integration/common.rs"]
mod common;

#[path = "integration/count_consistency.rs"]
mod count_consistency;
#[path = "integration/multi_term_search.rs"]
mod multi_term_search;
#[path = "integration/query_preprocessing.rs"]
mod query_preprocessing;
