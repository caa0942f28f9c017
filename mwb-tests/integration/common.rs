//! Shared fixtures for pipeline tests.

use std::sync::Arc;

use mwb_core::SearchDefaults;
use mwb_search::providers::mock::{MockProvider, item};
use mwb_search::{Outcome, ResultItem, SearchService};

pub fn terms(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|t| t.to_string()).collect()
}

/// Broadcast with a timestamp, so sort order is observable.
pub fn broadcast(channel: &str, topic: &str, title: &str, url: &str, timestamp: i64) -> ResultItem {
    let mut broadcast = item(channel, topic, title, url);
    broadcast.timestamp = timestamp;
    broadcast
}

/// Service over a shared mock, so tests can inspect the requests it received.
pub fn service_over(provider: MockProvider) -> (SearchService, Arc<MockProvider>) {
    let provider = Arc::new(provider);
    let service = SearchService::new(Box::new(Arc::clone(&provider)), SearchDefaults::default());
    (service, provider)
}

pub fn items(outcome: Outcome) -> Vec<ResultItem> {
    match outcome {
        Outcome::Items(items) => items,
        Outcome::Count(count) => panic!("expected items, got count {count}"),
    }
}

pub fn urls(items: &[ResultItem]) -> Vec<&str> {
    items.iter().map(|i| i.url_video.as_str()).collect()
}
