//! Count-only mode and windowing over the filtered, deduplicated set.

use mwb_search::providers::mock::MockProvider;
use mwb_search::{Outcome, SearchOptions};
use proptest::prelude::*;

use crate::common::{broadcast, items, service_over, terms, urls};

fn provider() -> MockProvider {
    MockProvider::new()
        .with_page(
            "tatort",
            vec![
                broadcast("ARD", "Tatort", "Borowski und der Engel", "1", 100),
                broadcast("ARD", "Tatort", "Borowski (Audiodeskription)", "2", 200),
                broadcast("ARD", "Tatort", "Faber", "3", 300),
            ],
        )
        .with_page(
            "kiel",
            vec![
                broadcast("ARD", "Tatort", "Borowski und der Engel", "1", 100),
                broadcast("NDR", "Nordmagazin", "Kiel heute", "4", 400),
            ],
        )
}

#[tokio::test]
async fn test_count_is_filtered_unique_total() {
    let (service, _) = service_over(provider());
    let options = SearchOptions {
        count_only: true,
        exclude: vec!["Audiodeskription".to_string()],
        ..SearchOptions::default()
    };

    let outcome = service.run(&terms(&["tatort", "kiel"]), &options).await.unwrap();
    assert_eq!(outcome, Outcome::Count(3));
}

#[tokio::test]
async fn test_include_patterns_select_any_match() {
    let (service, _) = service_over(provider());
    let options = SearchOptions {
        include: vec!["Faber".to_string(), "(?i)KIEL".to_string()],
        ..SearchOptions::default()
    };

    let found = items(service.run(&terms(&["tatort", "kiel"]), &options).await.unwrap());
    // newest first by default
    assert_eq!(urls(&found), vec!["4", "3"]);
}

#[tokio::test]
async fn test_invalid_pattern_issues_no_request() {
    let (service, provider) = service_over(provider());
    let options = SearchOptions {
        exclude: vec!["Borowski(".to_string()],
        ..SearchOptions::default()
    };

    let err = service.run(&terms(&["tatort"]), &options).await.unwrap_err();
    assert!(err.is_user_error());
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn test_offset_past_end_is_empty_success() {
    let (service, _) = service_over(provider());
    let options = SearchOptions {
        offset: 50,
        ..SearchOptions::default()
    };

    let found = items(service.run(&terms(&["tatort"]), &options).await.unwrap());
    assert!(found.is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_count_independent_of_window(size in 1usize..10, offset in 0usize..10) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let count = runtime.block_on(async {
            let (service, _) = service_over(provider());
            let options = SearchOptions {
                count_only: true,
                size,
                offset,
                ..SearchOptions::default()
            };
            service.run(&terms(&["tatort", "kiel"]), &options).await.unwrap()
        });
        prop_assert_eq!(count, Outcome::Count(4));

        let page = runtime.block_on(async {
            let (service, _) = service_over(provider());
            let options = SearchOptions { size, offset, ..SearchOptions::default() };
            items(service.run(&terms(&["tatort", "kiel"]), &options).await.unwrap())
        });
        prop_assert_eq!(page.len(), size.min(4usize.saturating_sub(offset)));
    }
}
