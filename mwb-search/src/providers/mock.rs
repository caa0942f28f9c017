//! Mock provider implementation for testing.
//!
//! Pages are scripted per source term (`SearchRequest::term`), so tests can
//! control exactly what each term of a multi-term search returns.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::SearchProvider;
use crate::errors::MediaSearchError;
use crate::types::{ResultItem, SearchRequest};

/// Builds a result item with empty description and zero timestamp/duration.
pub fn item(channel: &str, topic: &str, title: &str, url_video: &str) -> ResultItem {
    ResultItem {
        channel: channel.to_string(),
        topic: topic.to_string(),
        title: title.to_string(),
        description: String::new(),
        timestamp: 0,
        duration: 0,
        url_video: url_video.to_string(),
        url_video_low: None,
        url_video_hd: None,
        url_website: None,
        url_subtitle: None,
    }
}

/// Mock provider for testing.
///
/// Unscripted terms return an empty page. Every request received is
/// recorded and can be inspected with [`MockProvider::requests`].
#[derive(Debug, Default)]
pub struct MockProvider {
    pages: HashMap<String, Vec<ResultItem>>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    channels: Vec<String>,
    received: Mutex<Vec<SearchRequest>>,
}

impl MockProvider {
    /// Creates a new mock provider for testing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the page returned for requests built from `term`.
    pub fn with_page(mut self, term: &str, items: Vec<ResultItem>) -> Self {
        self.pages.insert(term.to_string(), items);
        self
    }

    /// Makes requests built from `term` fail with `SearchFailed`.
    pub fn with_failure(mut self, term: &str) -> Self {
        self.failing.insert(term.to_string());
        self
    }

    /// Delays the answer for `term`, to shuffle completion order.
    pub fn with_delay(mut self, term: &str, delay: Duration) -> Self {
        self.delays.insert(term.to_string(), delay);
        self
    }

    /// Channels returned by `list_channels`, as given.
    pub fn with_channels(mut self, channels: &[&str]) -> Self {
        self.channels = channels.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<SearchRequest> {
        self.received.lock().clone()
    }
}

#[async_trait]
impl SearchProvider for MockProvider {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<ResultItem>, MediaSearchError> {
        self.received.lock().push(request.clone());

        if let Some(delay) = self.delays.get(&request.term) {
            tokio::time::sleep(*delay).await;
        }

        if self.failing.contains(&request.term) {
            return Err(MediaSearchError::SearchFailed {
                query: request.term.clone(),
                reason: "mock failure".to_string(),
            });
        }

        Ok(self.pages.get(&request.term).cloned().unwrap_or_default())
    }

    async fn list_channels(&self) -> Result<Vec<String>, MediaSearchError> {
        Ok(self.channels.clone())
    }
}
