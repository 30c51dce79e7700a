//! Search configuration with deployment defaults.
//!
//! [`SearchConfig`] is passed explicitly into provider constructors and the
//! aggregator. [`SearchConfig::from_env`] is the only place that reads the
//! process environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{SearchError, SearchResult};

pub const GOOGLE_API_KEY_VAR: &str = "GOOGLE_API_KEY";
pub const GOOGLE_CSE_ID_VAR: &str = "GOOGLE_CSE_ID";
pub const CACHE_TTL_VAR: &str = "TH0RN0_CACHE_TTL_SECONDS";
pub const CACHE_MAX_ENTRIES_VAR: &str = "TH0RN0_CACHE_MAX_ENTRIES";
pub const REQUEST_TIMEOUT_VAR: &str = "TH0RN0_REQUEST_TIMEOUT_SECONDS";

/// Credentials for the Google Custom Search JSON API.
#[derive(Clone, PartialEq, Eq)]
pub struct GoogleCredentials {
    pub api_key: String,
    /// Programmable search engine identifier (`cx`)
    pub cse_id: String,
}

impl std::fmt::Debug for GoogleCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleCredentials")
            .field("api_key", &"<redacted>")
            .field("cse_id", &self.cse_id)
            .finish()
    }
}

impl GoogleCredentials {
    pub fn new(api_key: impl Into<String>, cse_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            cse_id: cse_id.into(),
        }
    }

    /// Both values must be present and non-empty, otherwise Google is
    /// simply left unconfigured.
    pub fn from_parts(api_key: Option<String>, cse_id: Option<String>) -> Option<Self> {
        match (api_key, cse_id) {
            (Some(key), Some(cx)) if !key.is_empty() && !cx.is_empty() => {
                Some(Self::new(key, cx))
            }
            _ => None,
        }
    }
}

/// Configuration for the search tool.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Google credentials. `None` makes the Google provider return nothing.
    pub google: Option<GoogleCredentials>,
    /// Per-request HTTP timeout in seconds.
    pub request_timeout_seconds: u64,
    /// How long aggregated results stay fresh in the cache.
    pub cache_ttl_seconds: u64,
    /// Maximum number of distinct `(query, num_results)` entries retained.
    pub cache_max_entries: usize,
    /// Interleave weight of Google results.
    pub google_weight: f64,
    /// Interleave weight of DuckDuckGo results.
    pub duckduckgo_weight: f64,
    /// Result count used when the caller does not ask for one.
    pub default_num_results: usize,
    /// Custom User-Agent header for provider requests.
    pub user_agent: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            google: None,
            request_timeout_seconds: 5,
            cache_ttl_seconds: 600,
            cache_max_entries: 128,
            google_weight: 0.7,
            duckduckgo_weight: 0.3,
            default_num_results: 20,
            user_agent: None,
        }
    }
}

impl SearchConfig {
    /// Build a configuration from the process environment on top of the
    /// defaults. Unset variables keep their default; malformed numbers are
    /// rejected.
    pub fn from_env() -> SearchResult<Self> {
        let mut config = Self {
            google: GoogleCredentials::from_parts(
                env::var(GOOGLE_API_KEY_VAR).ok(),
                env::var(GOOGLE_CSE_ID_VAR).ok(),
            ),
            ..Default::default()
        };

        if let Some(ttl) = parse_var(CACHE_TTL_VAR)? {
            config.cache_ttl_seconds = ttl;
        }
        if let Some(max_entries) = parse_var(CACHE_MAX_ENTRIES_VAR)? {
            config.cache_max_entries = max_entries;
        }
        if let Some(timeout) = parse_var(REQUEST_TIMEOUT_VAR)? {
            config.request_timeout_seconds = timeout;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_google(mut self, credentials: GoogleCredentials) -> Self {
        self.google = Some(credentials);
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    /// Checks:
    /// - `request_timeout_seconds` must be greater than 0
    /// - `cache_max_entries` must be greater than 0
    /// - weights must be finite and non-negative
    pub fn validate(&self) -> SearchResult<()> {
        if self.request_timeout_seconds == 0 {
            return Err(SearchError::ConfigError(
                "request_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.cache_max_entries == 0 {
            return Err(SearchError::ConfigError(
                "cache_max_entries must be greater than 0".into(),
            ));
        }
        for (name, weight) in [
            ("google_weight", self.google_weight),
            ("duckduckgo_weight", self.duckduckgo_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(SearchError::ConfigError(format!(
                    "{name} must be a finite, non-negative number"
                )));
            }
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &str) -> SearchResult<Option<T>> {
    match env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SearchError::ConfigError(format!("{name} is not a valid number: {raw}"))),
        Err(_) => Ok(None),
    }
}
