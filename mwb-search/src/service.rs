//! Search pipeline: preprocess, multi-search, filter, then count or arrange.

use mwb_core::{MwbConfig, SearchDefaults, SortKey, SortOrder};

use crate::arrange::arrange;
use crate::errors::MediaSearchError;
use crate::filter::FilterSpec;
use crate::multi_search::MultiSearch;
use crate::providers::{MediathekProvider, SearchProvider};
use crate::types::{QueryOptions, ResultItem};

/// Options of one search invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Keep items matching any of these patterns
    pub include: Vec<String>,
    /// Drop items matching any of these patterns
    pub exclude: Vec<String>,
    pub size: usize,
    pub offset: usize,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
    pub include_future: bool,
    /// Report only how many items survive filtering
    pub count_only: bool,
    /// Emit an event per finished term
    pub report_progress: bool,
}

impl SearchOptions {
    pub fn from_defaults(defaults: &SearchDefaults) -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            size: defaults.size,
            offset: defaults.offset,
            sort_key: defaults.sort_key,
            sort_order: defaults.sort_order,
            include_future: defaults.include_future,
            count_only: false,
            report_progress: false,
        }
    }

    /// # Errors
    /// - `MediaSearchError::InvalidOption` - `size` is zero
    pub fn validate(&self) -> Result<(), MediaSearchError> {
        if self.size == 0 {
            return Err(MediaSearchError::InvalidOption {
                name: "size".to_string(),
                value: self.size.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::from_defaults(&SearchDefaults::default())
    }
}

/// Result of a search invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Sorted, windowed items
    Items(Vec<ResultItem>),
    /// Number of filtered items, independent of size and offset
    Count(usize),
}

/// Media search service running the full pipeline against one provider.
#[derive(Debug)]
pub struct SearchService {
    provider: Box<dyn SearchProvider>,
    defaults: SearchDefaults,
}

impl SearchService {
    pub fn new(provider: Box<dyn SearchProvider>, defaults: SearchDefaults) -> Self {
        Self { provider, defaults }
    }

    /// Creates the service against the MediathekViewWeb index.
    ///
    /// # Errors
    /// - `MediaSearchError::Configuration` - base URL is invalid
    /// - `MediaSearchError::NetworkError` - HTTP client could not be built
    pub fn from_config(config: &MwbConfig) -> Result<Self, MediaSearchError> {
        let provider = MediathekProvider::from_config(config)?;
        Ok(Self::new(Box::new(provider), config.search.clone()))
    }

    pub fn defaults(&self) -> &SearchDefaults {
        &self.defaults
    }

    /// Runs `terms` through the pipeline.
    ///
    /// Patterns and terms are validated before any request is issued. The
    /// index is asked for the whole window up to `offset + size` (or for
    /// `count_fetch_size` items when counting), and sort and window are
    /// applied again locally after merging and filtering.
    ///
    /// # Errors
    /// - `MediaSearchError::InvalidOption` - invalid size
    /// - `MediaSearchError::InvalidPattern` - include or exclude pattern does not compile
    /// - Any error of [`MultiSearch::execute`]
    pub async fn run(
        &self,
        terms: &[String],
        options: &SearchOptions,
    ) -> Result<Outcome, MediaSearchError> {
        options.validate()?;
        let filter = FilterSpec::new(&options.include, &options.exclude)?;

        let upstream = QueryOptions {
            size: if options.count_only {
                self.defaults.count_fetch_size
            } else {
                options.offset.saturating_add(options.size)
            },
            offset: 0,
            sort_key: options.sort_key,
            sort_order: options.sort_order,
            include_future: options.include_future,
        };

        let unified = MultiSearch::new(self.provider.as_ref())
            .with_concurrency(self.defaults.max_concurrent_searches)
            .with_progress(options.report_progress)
            .execute(terms, &upstream)
            .await?;

        let filtered = filter.apply(unified);

        if options.count_only {
            tracing::debug!(count = filtered.len(), "Counted filtered results");
            return Ok(Outcome::Count(filtered.len()));
        }

        Ok(Outcome::Items(arrange(
            filtered,
            options.sort_key,
            options.sort_order,
            options.offset,
            options.size,
        )))
    }

    /// Channel names known to the index, sorted and unique.
    ///
    /// # Errors
    /// - Upstream errors of the provider
    pub async fn list_channels(&self) -> Result<Vec<String>, MediaSearchError> {
        self.provider.list_channels().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::providers::mock::{MockProvider, item};

    fn terms(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|t| t.to_string()).collect()
    }

    fn stamped(title: &str, url: &str, timestamp: i64) -> ResultItem {
        let mut item = item("ARD", "Tatort", title, url);
        item.timestamp = timestamp;
        item
    }

    fn service(provider: MockProvider) -> SearchService {
        SearchService::new(Box::new(provider), SearchDefaults::default())
    }

    #[tokio::test]
    async fn test_run_sorts_and_windows_merged_results() {
        let provider = MockProvider::new()
            .with_page("tatort", vec![stamped("a", "1", 100), stamped("b", "2", 300)])
            .with_page("polizeiruf", vec![stamped("c", "3", 200), stamped("a", "1", 100)]);

        let options = SearchOptions {
            offset: 1,
            size: 1,
            ..SearchOptions::default()
        };
        let outcome = service(provider)
            .run(&terms(&["tatort", "polizeiruf"]), &options)
            .await
            .unwrap();

        match outcome {
            Outcome::Items(items) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].title, "c");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_upstream_window_covers_offset() {
        let provider = Arc::new(MockProvider::new());
        let svc = SearchService::new(Box::new(Arc::clone(&provider)), SearchDefaults::default());
        let options = SearchOptions {
            offset: 20,
            size: 5,
            ..SearchOptions::default()
        };

        svc.run(&terms(&["tatort"]), &options).await.unwrap();

        let requests = provider.requests();
        assert_eq!(requests[0].size, 25);
        assert_eq!(requests[0].offset, 0);
    }

    #[tokio::test]
    async fn test_count_fetches_configured_window() {
        let provider = Arc::new(MockProvider::new());
        let svc = SearchService::new(Box::new(Arc::clone(&provider)), SearchDefaults::default());
        let options = SearchOptions {
            count_only: true,
            ..SearchOptions::default()
        };

        svc.run(&terms(&["tatort"]), &options).await.unwrap();

        assert_eq!(provider.requests()[0].size, svc.defaults().count_fetch_size);
    }

    #[tokio::test]
    async fn test_count_ignores_size_and_offset() {
        let page = vec![stamped("a", "1", 1), stamped("b", "2", 2), stamped("c", "3", 3)];
        let options = SearchOptions {
            count_only: true,
            size: 1,
            offset: 2,
            exclude: vec!["^b".to_string()],
            ..SearchOptions::default()
        };

        let outcome = service(MockProvider::new().with_page("tatort", page))
            .run(&terms(&["tatort"]), &options)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Count(2));
    }

    #[tokio::test]
    async fn test_invalid_pattern_rejected_before_search() {
        let options = SearchOptions {
            include: vec!["[".to_string()],
            ..SearchOptions::default()
        };
        let err = service(MockProvider::new())
            .run(&terms(&["tatort"]), &options)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaSearchError::InvalidPattern { .. }));
    }

    #[tokio::test]
    async fn test_zero_size_rejected() {
        let options = SearchOptions {
            size: 0,
            ..SearchOptions::default()
        };
        let err = service(MockProvider::new())
            .run(&terms(&["tatort"]), &options)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaSearchError::InvalidOption { .. }));
        assert!(err.is_user_error());
    }

    #[tokio::test]
    async fn test_list_channels_delegates() {
        let svc = service(MockProvider::new().with_channels(&["ARD", "ZDF"]));
        assert_eq!(svc.list_channels().await.unwrap(), vec!["ARD", "ZDF"]);
    }
}
