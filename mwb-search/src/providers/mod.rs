//! Provider implementations for the media search index.

use async_trait::async_trait;

use crate::errors::MediaSearchError;
use crate::types::{ResultItem, SearchRequest};

pub mod mediathek;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use mediathek::MediathekProvider;
#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockProvider;

/// Trait for media index search providers.
///
/// Implementations answer one structured request at a time (the HTTP
/// client for MediathekViewWeb, scripted providers for testing). Retries
/// and timeouts, if any, are the provider's business.
#[async_trait]
pub trait SearchProvider: Send + Sync + std::fmt::Debug {
    /// Runs one search request and returns its page in index order.
    ///
    /// # Errors
    /// - `MediaSearchError::SearchFailed` - Index rejected the request
    /// - `MediaSearchError::NetworkError` - Network connectivity issues
    /// - `MediaSearchError::ParseError` - Response could not be decoded
    async fn search(&self, request: &SearchRequest) -> Result<Vec<ResultItem>, MediaSearchError>;

    /// Lists the channel names known to the index, sorted and unique.
    ///
    /// # Errors
    /// Same as [`SearchProvider::search`].
    async fn list_channels(&self) -> Result<Vec<String>, MediaSearchError>;
}

#[async_trait]
impl<P: SearchProvider + ?Sized> SearchProvider for std::sync::Arc<P> {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<ResultItem>, MediaSearchError> {
        (**self).search(request).await
    }

    async fn list_channels(&self) -> Result<Vec<String>, MediaSearchError> {
        (**self).list_channels().await
    }
}
