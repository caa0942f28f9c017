//! Multi-term search: fan out one request per term, merge, deduplicate.
//!
//! Requests run concurrently up to a configured limit, but pages are
//! collected in term order, so the merged sequence never depends on which
//! request finished first. Deduplication keys on the video URL and keeps
//! the first occurrence.

use std::collections::HashSet;
use std::time::Instant;

use futures::stream::{self, StreamExt};

use crate::errors::MediaSearchError;
use crate::preprocess::preprocess;
use crate::providers::SearchProvider;
use crate::types::{QueryOptions, ResultItem, SearchRequest};

/// Ordered result sequence in which no video URL appears twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnifiedResultSet {
    items: Vec<ResultItem>,
}

impl UnifiedResultSet {
    /// Concatenates pages in order and drops repeated URLs, first one wins.
    pub fn unify(pages: impl IntoIterator<Item = Vec<ResultItem>>) -> Self {
        Self {
            items: dedup_by_url(pages.into_iter().flatten()),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResultItem> {
        self.items.iter()
    }

    pub fn items(&self) -> &[ResultItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ResultItem> {
        self.items
    }

    /// Keeps the items for which `keep` returns true; removal cannot break uniqueness.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&ResultItem) -> bool,
    {
        self.items.retain(keep);
    }
}

impl IntoIterator for UnifiedResultSet {
    type Item = ResultItem;
    type IntoIter = std::vec::IntoIter<ResultItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Removes items whose video URL was already seen, preserving order.
///
/// Items without a URL carry no identity and are always kept.
pub fn dedup_by_url(items: impl IntoIterator<Item = ResultItem>) -> Vec<ResultItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| item.url_video.is_empty() || seen.insert(item.url_video.clone()))
        .collect()
}

/// Executes preprocessed terms against a provider and unifies the pages.
#[derive(Debug)]
pub struct MultiSearch<'a> {
    provider: &'a dyn SearchProvider,
    max_concurrent: usize,
    report_progress: bool,
}

impl<'a> MultiSearch<'a> {
    /// Sequential search without progress reporting.
    pub fn new(provider: &'a dyn SearchProvider) -> Self {
        Self {
            provider,
            max_concurrent: 1,
            report_progress: false,
        }
    }

    /// Allows up to `limit` per-term requests in flight at once.
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrent = limit.max(1);
        self
    }

    /// Emits an `info` event per finished term.
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.report_progress = enabled;
        self
    }

    /// Runs every term and returns the unified result set.
    ///
    /// A single request propagates its error unchanged. With several
    /// requests, the first failing term (in term order) fails the whole
    /// search and is named in the error.
    ///
    /// # Errors
    /// - Input errors of [`preprocess`], before any request is issued
    /// - `MediaSearchError::TermFailed` - one of several terms failed upstream
    /// - Upstream errors of the provider when only one request is issued
    pub async fn execute(
        &self,
        terms: &[String],
        options: &QueryOptions,
    ) -> Result<UnifiedResultSet, MediaSearchError> {
        let requests = preprocess(terms, options)?;
        let started = Instant::now();

        let pages = if let [request] = requests.as_slice() {
            let page = self.provider.search(request).await?;
            self.report(1, 1, request, page.len());
            vec![page]
        } else {
            self.execute_all(&requests).await?
        };

        let raw_count: usize = pages.iter().map(Vec::len).sum();
        let unified = UnifiedResultSet::unify(pages);

        tracing::info!(
            requests = requests.len(),
            raw_count,
            unique_count = unified.len(),
            duration_ms = %started.elapsed().as_millis(),
            "Search operation completed"
        );

        Ok(unified)
    }

    async fn execute_all(
        &self,
        requests: &[SearchRequest],
    ) -> Result<Vec<Vec<ResultItem>>, MediaSearchError> {
        let total = requests.len();

        // buffered() yields in submission order, one slot per term
        let mut pages = stream::iter(requests.iter().enumerate())
            .map(|(i, request)| async move {
                self.provider
                    .search(request)
                    .await
                    .map_err(|e| MediaSearchError::TermFailed {
                        term: request.term.clone(),
                        index: i + 1,
                        source: Box::new(e),
                    })
            })
            .buffered(self.max_concurrent);

        let mut collected = Vec::with_capacity(total);
        let mut running = 0;
        while let Some(page) = pages.next().await {
            let page = page?;
            running += page.len();
            self.report(collected.len() + 1, total, &requests[collected.len()], running);
            collected.push(page);
        }

        Ok(collected)
    }

    fn report(&self, index: usize, total: usize, request: &SearchRequest, running: usize) {
        if self.report_progress {
            tracing::info!(
                term = %request.term,
                index,
                total,
                running_count = running,
                "Search term finished"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::providers::mock::{MockProvider, item};

    fn terms(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_first_seen_wins() {
        let mut from_a = item("ARD", "Tatort", "Borowski", "u");
        from_a.description = "version A".to_string();
        let mut from_b = from_a.clone();
        from_b.description = "version B".to_string();

        let unified = UnifiedResultSet::unify(vec![
            vec![from_a.clone(), item("ARD", "Tatort", "Faber", "v")],
            vec![from_b, item("ZDF", "Krimi", "Wilsberg", "w")],
        ]);

        let urls: Vec<&str> = unified.iter().map(|i| i.url_video.as_str()).collect();
        assert_eq!(urls, vec!["u", "v", "w"]);
        assert_eq!(unified.items()[0].description, "version A");
    }

    #[test]
    fn test_items_without_url_never_collapse() {
        let unified = UnifiedResultSet::unify(vec![
            vec![item("ARD", "Tatort", "Borowski", ""), item("ARD", "Tatort", "Faber", "v")],
            vec![item("ZDF", "Krimi", "Wilsberg", ""), item("ARD", "Tatort", "Faber", "v")],
        ]);

        let titles: Vec<&str> = unified.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Borowski", "Faber", "Wilsberg"]);
    }

    #[tokio::test]
    async fn test_single_term_keeps_provider_order() {
        let provider = MockProvider::new().with_page(
            "tatort",
            vec![
                item("ARD", "Tatort", "C", "c"),
                item("ARD", "Tatort", "A", "a"),
                item("ARD", "Tatort", "B", "b"),
            ],
        );

        let unified = MultiSearch::new(&provider)
            .execute(&terms(&["tatort"]), &QueryOptions::default())
            .await
            .unwrap();

        let titles: Vec<&str> = unified.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "A", "B"]);
        assert_eq!(provider.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_one_request_per_term_in_term_order() {
        let provider = MockProvider::new()
            .with_page(
                "tatort",
                vec![item("ARD", "Tatort", "T1", "t1"), item("ARD", "Tatort", "X", "x")],
            )
            .with_page(
                "polizeiruf",
                vec![
                    item("ARD", "Polizeiruf", "X", "x"),
                    item("ARD", "Polizeiruf", "P1", "p1"),
                ],
            )
            .with_delay("tatort", std::time::Duration::from_millis(50));

        let unified = MultiSearch::new(&provider)
            .with_concurrency(4)
            .with_progress(true)
            .execute(&terms(&["tatort", "polizeiruf"]), &QueryOptions::default())
            .await
            .unwrap();

        let urls: Vec<&str> = unified.iter().map(|i| i.url_video.as_str()).collect();
        assert_eq!(urls, vec!["t1", "x", "p1"]);
        assert_eq!(unified.items()[1].topic, "Tatort");
        assert_eq!(provider.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_failing_term_fails_whole_search() {
        let provider = MockProvider::new()
            .with_page("tatort", vec![item("ARD", "Tatort", "T1", "t1")])
            .with_failure("polizeiruf");

        let err = MultiSearch::new(&provider)
            .execute(&terms(&["tatort", "polizeiruf"]), &QueryOptions::default())
            .await
            .unwrap_err();

        match err {
            MediaSearchError::TermFailed { term, index, .. } => {
                assert_eq!(term, "polizeiruf");
                assert_eq!(index, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_single_term_failure_propagates_unwrapped() {
        let provider = MockProvider::new().with_failure("tatort");

        let err = MultiSearch::new(&provider)
            .execute(&terms(&["tatort"]), &QueryOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, MediaSearchError::SearchFailed { .. }));
    }

    #[tokio::test]
    async fn test_input_error_issues_no_request() {
        let provider = MockProvider::new();

        let err = MultiSearch::new(&provider)
            .execute(&terms(&["tatort", "!"]), &QueryOptions::default())
            .await
            .unwrap_err();

        assert!(err.is_user_error());
        assert!(provider.requests().is_empty());
    }

    fn arb_items() -> impl Strategy<Value = Vec<ResultItem>> {
        prop::collection::vec(("[a-e]", "[A-Z]{1,4}"), 0..30).prop_map(|pairs| {
            pairs
                .into_iter()
                .map(|(url, title)| item("ARD", "Topic", &title, &url))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_dedup_is_idempotent(a in arb_items(), b in arb_items()) {
            let once = UnifiedResultSet::unify(vec![a, b]);
            let twice = UnifiedResultSet::unify(vec![once.clone().into_items()]);
            prop_assert_eq!(&once, &twice);

            let urls: HashSet<&str> = once.iter().map(|i| i.url_video.as_str()).collect();
            prop_assert_eq!(urls.len(), once.len());
        }

        #[test]
        fn prop_dedup_never_reorders(items in arb_items()) {
            let unified = UnifiedResultSet::unify(vec![items.clone()]);
            let positions: Vec<usize> = unified
                .iter()
                .map(|kept| items.iter().position(|i| i.url_video == kept.url_video).unwrap())
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
            for (kept, position) in unified.iter().zip(&positions) {
                prop_assert_eq!(kept, &items[*position]);
            }
        }
    }
}
