//! Fan-out, unification and failure policy of multi-term searches.

use std::time::Duration;

use mwb_core::{SortKey, SortOrder};
use mwb_search::providers::mock::MockProvider;
use mwb_search::{MediaSearchError, SearchOptions};

use crate::common::{broadcast, items, service_over, terms, urls};

fn oldest_first() -> SearchOptions {
    SearchOptions {
        sort_key: SortKey::Timestamp,
        sort_order: SortOrder::Ascending,
        size: 50,
        ..SearchOptions::default()
    }
}

#[tokio::test]
async fn test_one_request_per_term_in_term_order() {
    let provider = MockProvider::new()
        .with_page("#Tatort", vec![broadcast("ARD", "Tatort", "Borowski", "t1", 1)])
        .with_page("#Polizeiruf", vec![broadcast("ARD", "Polizeiruf 110", "Kiel", "p1", 2)])
        .with_page("wilsberg", vec![broadcast("ZDF", "Wilsberg", "Münster", "w1", 3)]);
    let (service, provider) = service_over(provider);

    let found = items(
        service
            .run(&terms(&["#Tatort", "#Polizeiruf", "wilsberg"]), &oldest_first())
            .await
            .unwrap(),
    );

    assert_eq!(urls(&found), vec!["t1", "p1", "w1"]);
    let sent: Vec<String> = provider.requests().into_iter().map(|r| r.term).collect();
    assert_eq!(sent.len(), 3);
    assert!(sent.contains(&"#Polizeiruf".to_string()));
}

#[tokio::test]
async fn test_shared_url_keeps_first_terms_version() {
    let mut from_a = broadcast("ARD", "Tatort", "Borowski", "u", 10);
    from_a.description = "aus Suche A".to_string();
    let mut from_b = from_a.clone();
    from_b.description = "aus Suche B".to_string();

    let provider = MockProvider::new()
        .with_page("A", vec![from_a])
        .with_page("B", vec![from_b, broadcast("ZDF", "Krimi", "Wilsberg", "v", 20)])
        // B answers first; order must still follow the terms
        .with_delay("A", Duration::from_millis(30));
    let (service, _) = service_over(provider);

    let found = items(service.run(&terms(&["A", "B"]), &oldest_first()).await.unwrap());

    assert_eq!(urls(&found), vec!["u", "v"]);
    assert_eq!(found[0].description, "aus Suche A");
}

#[tokio::test]
async fn test_failing_term_fails_the_search_and_is_named() {
    let provider = MockProvider::new()
        .with_page("tatort", vec![broadcast("ARD", "Tatort", "Borowski", "t1", 1)])
        .with_failure("!KIKA");
    let (service, _) = service_over(provider);

    let err = service
        .run(&terms(&["tatort", "!KIKA"]), &oldest_first())
        .await
        .unwrap_err();

    assert!(err.is_upstream_error());
    match err {
        MediaSearchError::TermFailed { term, index, source } => {
            assert_eq!(term, "!KIKA");
            assert_eq!(index, 2);
            assert!(matches!(*source, MediaSearchError::SearchFailed { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_single_term_error_is_not_wrapped() {
    let (service, _) = service_over(MockProvider::new().with_failure("tatort"));

    let err = service.run(&terms(&["tatort"]), &oldest_first()).await.unwrap_err();
    assert!(matches!(err, MediaSearchError::SearchFailed { .. }));
}

#[tokio::test]
async fn test_progress_reporting_does_not_change_results() {
    let page_a = vec![
        broadcast("ARD", "Tatort", "A1", "a1", 5),
        broadcast("ARD", "Tatort", "X", "x", 6),
    ];
    let page_b = vec![
        broadcast("ARD", "Polizeiruf", "X", "x", 6),
        broadcast("ARD", "Polizeiruf", "B1", "b1", 7),
    ];
    let query = terms(&["a", "b"]);

    let quiet = {
        let (service, _) = service_over(
            MockProvider::new()
                .with_page("a", page_a.clone())
                .with_page("b", page_b.clone()),
        );
        items(service.run(&query, &oldest_first()).await.unwrap())
    };
    let verbose = {
        let (service, _) =
            service_over(MockProvider::new().with_page("a", page_a).with_page("b", page_b));
        let options = SearchOptions {
            report_progress: true,
            ..oldest_first()
        };
        items(service.run(&query, &options).await.unwrap())
    };

    assert_eq!(quiet, verbose);
    assert_eq!(verbose[1].topic, "Tatort");
}
