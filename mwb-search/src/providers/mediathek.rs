//! MediathekViewWeb search provider for production use.

use std::time::Instant;

use async_trait::async_trait;
use mwb_core::MwbConfig;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use url::Url;

use super::SearchProvider;
use crate::errors::MediaSearchError;
use crate::types::{QueryOptions, ResultItem, SearchRequest};

/// MediathekViewWeb provider for real broadcast discovery.
///
/// Speaks the JSON query API of the index: one POST per request, with the
/// body sent as `text/plain` as the API requires.
#[derive(Debug)]
pub struct MediathekProvider {
    client: reqwest::Client,
    query_url: Url,
    channel_probe_size: usize,
}

/// Body of a query request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireQuery {
    queries: Vec<WireClause>,
    sort_by: &'static str,
    sort_order: &'static str,
    future: bool,
    offset: usize,
    size: usize,
    #[serde(rename = "duration_min", skip_serializing_if = "Option::is_none")]
    duration_min: Option<u64>,
    #[serde(rename = "duration_max", skip_serializing_if = "Option::is_none")]
    duration_max: Option<u64>,
}

/// One AND-ed clause: `query` must match in any of `fields`.
#[derive(Debug, Serialize)]
struct WireClause {
    fields: Vec<&'static str>,
    query: String,
}

/// Response envelope of the query endpoint.
#[derive(Debug, Deserialize)]
struct WireResponse {
    result: Option<WireResult>,
    #[serde(default)]
    err: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct WireResult {
    results: Vec<WireItem>,
    #[serde(rename = "queryInfo")]
    query_info: Option<WireQueryInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireQueryInfo {
    #[serde(default)]
    total_results: Option<u64>,
}

/// Single broadcast entry as the index returns it.
#[derive(Debug, Deserialize)]
struct WireItem {
    #[serde(default)]
    channel: String,
    #[serde(default)]
    topic: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    timestamp: Option<i64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    duration: Option<u64>,
    #[serde(default)]
    url_video: String,
    #[serde(default)]
    url_video_low: Option<String>,
    #[serde(default)]
    url_video_hd: Option<String>,
    #[serde(default)]
    url_website: Option<String>,
    #[serde(default)]
    url_subtitle: Option<String>,
}

impl From<WireItem> for ResultItem {
    fn from(wire: WireItem) -> Self {
        ResultItem {
            channel: wire.channel,
            topic: wire.topic,
            title: wire.title,
            description: wire.description.unwrap_or_default(),
            timestamp: wire.timestamp.unwrap_or_default(),
            duration: wire.duration.unwrap_or_default(),
            url_video: wire.url_video,
            url_video_low: non_empty(wire.url_video_low),
            url_video_hd: non_empty(wire.url_video_hd),
            url_website: non_empty(wire.url_website),
            url_subtitle: non_empty(wire.url_subtitle),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Numbers sometimes arrive as strings, and missing durations as `""`.
fn lenient_number(value: Option<Value>) -> Option<i128> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from))
            .or_else(|| n.as_f64().map(|f| f as i128)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(lenient_number(value).and_then(|n| i64::try_from(n).ok()))
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(lenient_number(value).and_then(|n| u64::try_from(n).ok()))
}

impl MediathekProvider {
    /// Create provider from the invocation's configuration.
    ///
    /// # Errors
    /// - `MediaSearchError::Configuration` - base URL is invalid
    /// - `MediaSearchError::NetworkError` - HTTP client could not be built
    pub fn from_config(config: &MwbConfig) -> Result<Self, MediaSearchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.api.user_agent.clone())
            .timeout(config.api.timeout)
            .build()
            .map_err(|e| MediaSearchError::NetworkError {
                reason: format!("HTTP client setup failed: {e}"),
            })?;

        Ok(Self {
            client,
            query_url: config.query_url()?,
            channel_probe_size: config.search.channel_probe_size,
        })
    }

    /// Translate a request into the wire body.
    fn wire_query(request: &SearchRequest) -> WireQuery {
        WireQuery {
            queries: request
                .constraints
                .iter()
                .map(|constraint| WireClause {
                    fields: constraint.fields.iter().map(|f| f.as_str()).collect(),
                    query: constraint.values.join(" "),
                })
                .collect(),
            sort_by: request.sort_key.as_str(),
            sort_order: request.sort_order.as_str(),
            future: request.include_future,
            offset: request.offset,
            size: request.size,
            duration_min: request.duration.min_seconds(),
            duration_max: request.duration.max_seconds(),
        }
    }

    /// Decode a response body into result items.
    fn parse_response(query: &str, body: &str) -> Result<Vec<ResultItem>, MediaSearchError> {
        let response: WireResponse =
            serde_json::from_str(body).map_err(|e| MediaSearchError::ParseError {
                reason: format!("MediathekViewWeb JSON parsing failed: {e}"),
            })?;

        if let Some(err) = response.err.filter(|e| !e.is_null()) {
            return Err(MediaSearchError::SearchFailed {
                query: query.to_string(),
                reason: format!("MediathekViewWeb error: {err}"),
            });
        }

        let result = response.result.ok_or_else(|| MediaSearchError::ParseError {
            reason: "MediathekViewWeb response without result".to_string(),
        })?;

        if let Some(total) = result.query_info.and_then(|info| info.total_results) {
            tracing::debug!(
                total_results = total,
                returned = result.results.len(),
                "Index page received"
            );
        }

        let mut items = Vec::with_capacity(result.results.len());
        for wire in result.results {
            if wire.url_video.trim().is_empty() {
                tracing::warn!(
                    channel = %wire.channel,
                    title = %wire.title,
                    "Skipping index entry without video URL"
                );
                continue;
            }
            items.push(ResultItem::from(wire));
        }

        Ok(items)
    }
}

#[async_trait]
impl SearchProvider for MediathekProvider {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<ResultItem>, MediaSearchError> {
        let body = serde_json::to_string(&Self::wire_query(request)).map_err(|e| {
            MediaSearchError::ParseError {
                reason: format!("Query encoding failed: {e}"),
            }
        })?;
        tracing::debug!(term = %request.term, body = %body, "Sending index query");

        let started = Instant::now();
        let response = self
            .client
            .post(self.query_url.clone())
            .header(CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .await
            .map_err(|e| MediaSearchError::NetworkError {
                reason: format!("MediathekViewWeb request failed: {e}"),
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| MediaSearchError::NetworkError {
                reason: format!("MediathekViewWeb response read failed: {e}"),
            })?;

        if !status.is_success() {
            return Err(MediaSearchError::SearchFailed {
                query: request.term.clone(),
                reason: format!("MediathekViewWeb HTTP {status}"),
            });
        }

        let items = Self::parse_response(&request.term, &text)?;
        tracing::info!(
            api = "mediathekviewweb",
            duration_ms = %started.elapsed().as_millis(),
            result_count = items.len(),
            "API request completed"
        );

        Ok(items)
    }

    async fn list_channels(&self) -> Result<Vec<String>, MediaSearchError> {
        // No channel endpoint: probe with a match-all query and collect names
        let options = QueryOptions {
            size: self.channel_probe_size,
            ..QueryOptions::default()
        };
        let probe = SearchRequest::match_all("<channel probe>", &options);

        let mut channels: Vec<String> = self
            .search(&probe)
            .await?
            .into_iter()
            .map(|item| item.channel)
            .filter(|c| !c.is_empty())
            .collect();
        channels.sort();
        channels.dedup();

        Ok(channels)
    }
}
