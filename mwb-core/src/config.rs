//! Centralized configuration for mwb.
//!
//! All tunable parameters and search defaults are defined here to avoid
//! hard-coded values scattered throughout the codebase. The record is
//! built once per invocation and passed down explicitly.

use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::ConfigError;
use crate::tracing_setup::CliLogLevel;

/// Central configuration for all mwb components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct MwbConfig {
    pub api: ApiConfig,
    pub search: SearchDefaults,
    pub logging: LoggingConfig,
}

/// Connection settings for the MediathekViewWeb index.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the index, without the `/api/...` path
    pub base_url: String,
    /// User agent for HTTP requests
    pub user_agent: String,
    /// Whole-request timeout
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: format!("mwb-cli/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
        }
    }
}

const DEFAULT_BASE_URL: &str = "https://mediathekviewweb.de";

/// Defaults applied to every search unless the caller overrides them.
#[derive(Debug, Clone)]
pub struct SearchDefaults {
    /// Page size handed to rendering
    pub size: usize,
    /// Number of filtered results skipped before the page starts
    pub offset: usize,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
    /// Include broadcasts scheduled in the future
    pub include_future: bool,
    /// Upper bound of per-term searches in flight at once
    pub max_concurrent_searches: usize,
    /// Items fetched per term when only the match count is wanted
    pub count_fetch_size: usize,
    /// Items fetched by the match-all probe used to list channels
    pub channel_probe_size: usize,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            size: 15,
            offset: 0,
            sort_key: SortKey::Timestamp,
            sort_order: SortOrder::Descending,
            include_future: true,
            max_concurrent_searches: 4,
            count_fetch_size: 1000,
            channel_probe_size: 1000,
        }
    }
}

/// Where and how verbosely to log.
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    /// Console level from the environment; CLI flags take precedence
    pub level: Option<CliLogLevel>,
    /// Directory receiving the full trace log of the last run
    pub logs_dir: Option<PathBuf>,
}

/// Field the result set is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Broadcast start
    Timestamp,
    /// Length in seconds
    Duration,
    /// Channel name, lexicographic
    Channel,
}

impl SortKey {
    /// Wire name understood by the index.
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Timestamp => "timestamp",
            SortKey::Duration => "duration",
            SortKey::Channel => "channel",
        }
    }
}

impl FromStr for SortKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "timestamp" => Ok(SortKey::Timestamp),
            "duration" => Ok(SortKey::Duration),
            "channel" => Ok(SortKey::Channel),
            _ => Err(ConfigError::UnsupportedSortKey { key: s.to_string() }),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of the ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    /// Wire name understood by the index.
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            _ => Err(ConfigError::UnsupportedSortOrder {
                order: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl MwbConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// # Errors
    /// - `ConfigError::InvalidBaseUrl` - `MWB_API_URL` is not an absolute URL
    /// - `ConfigError::InvalidOverride` - a numeric or level override does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Applies overrides from an arbitrary variable source.
    ///
    /// # Errors
    /// Same as [`MwbConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("MWB_API_URL") {
            config.api.base_url = url;
            config.query_url()?;
        }

        if let Some(seconds) = lookup("MWB_TIMEOUT_SECS") {
            config.api.timeout = Duration::from_secs(parse_override("MWB_TIMEOUT_SECS", &seconds)?);
        }

        if let Some(limit) = lookup("MWB_MAX_CONCURRENT") {
            let limit: usize = parse_override("MWB_MAX_CONCURRENT", &limit)?;
            config.search.max_concurrent_searches = limit.max(1);
        }

        if let Some(size) = lookup("MWB_COUNT_FETCH_SIZE") {
            let size: NonZeroUsize = parse_override("MWB_COUNT_FETCH_SIZE", &size)?;
            config.search.count_fetch_size = size.get();
        }

        if let Some(level) = lookup("MWB_LOG_LEVEL") {
            config.logging.level = Some(level.parse().map_err(|reason| {
                ConfigError::InvalidOverride {
                    variable: "MWB_LOG_LEVEL".to_string(),
                    value: level.clone(),
                    reason,
                }
            })?);
        }

        config.logging.logs_dir = lookup("MWB_LOG_DIR").map(PathBuf::from);

        Ok(config)
    }

    /// Full URL of the query endpoint.
    ///
    /// # Errors
    /// - `ConfigError::InvalidBaseUrl` - base URL is not absolute or cannot carry a path
    pub fn query_url(&self) -> Result<Url, ConfigError> {
        let invalid = |e: url::ParseError| ConfigError::InvalidBaseUrl {
            url: self.api.base_url.clone(),
            reason: e.to_string(),
        };
        Url::parse(&self.api.base_url)
            .map_err(invalid)?
            .join("api/query")
            .map_err(invalid)
    }
}

fn parse_override<T>(variable: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidOverride {
            variable: variable.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config_values() {
        let config = MwbConfig::default();

        assert_eq!(
            config.query_url().unwrap().as_str(),
            "https://mediathekviewweb.de/api/query"
        );
        assert_eq!(config.api.timeout, Duration::from_secs(30));
        assert!(config.api.user_agent.starts_with("mwb-cli/"));
        assert_eq!(config.search.size, 15);
        assert_eq!(config.search.offset, 0);
        assert_eq!(config.search.sort_key, SortKey::Timestamp);
        assert_eq!(config.search.sort_order, SortOrder::Descending);
        assert!(config.search.include_future);
        assert!(config.logging.logs_dir.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let config = MwbConfig::from_lookup(lookup_from(&[
            ("MWB_API_URL", "http://localhost:8000"),
            ("MWB_TIMEOUT_SECS", "5"),
            ("MWB_MAX_CONCURRENT", "0"),
            ("MWB_COUNT_FETCH_SIZE", "250"),
            ("MWB_LOG_LEVEL", "debug"),
            ("MWB_LOG_DIR", "/tmp/mwb-logs"),
        ]))
        .unwrap();

        assert_eq!(
            config.query_url().unwrap().as_str(),
            "http://localhost:8000/api/query"
        );
        assert_eq!(config.api.timeout, Duration::from_secs(5));
        assert_eq!(config.search.max_concurrent_searches, 1);
        assert_eq!(config.search.count_fetch_size, 250);
        assert!(matches!(config.logging.level, Some(CliLogLevel::Debug)));
        assert_eq!(config.logging.logs_dir, Some(PathBuf::from("/tmp/mwb-logs")));
    }

    #[test]
    fn test_invalid_overrides_rejected() {
        let err =
            MwbConfig::from_lookup(lookup_from(&[("MWB_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidOverride { ref variable, .. } if variable == "MWB_TIMEOUT_SECS"
        ));

        let err = MwbConfig::from_lookup(lookup_from(&[("MWB_API_URL", "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn test_zero_count_fetch_size_rejected() {
        let err =
            MwbConfig::from_lookup(lookup_from(&[("MWB_COUNT_FETCH_SIZE", "0")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidOverride { ref variable, ref value, .. }
                if variable == "MWB_COUNT_FETCH_SIZE" && value == "0"
        ));
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!("duration".parse::<SortKey>().unwrap(), SortKey::Duration);
        assert_eq!("Channel".parse::<SortKey>().unwrap(), SortKey::Channel);
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Ascending);
        assert!(matches!(
            "relevance".parse::<SortKey>(),
            Err(ConfigError::UnsupportedSortKey { .. })
        ));
        assert!(matches!(
            "sideways".parse::<SortOrder>(),
            Err(ConfigError::UnsupportedSortOrder { .. })
        ));
    }
}
