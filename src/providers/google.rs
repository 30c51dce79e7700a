//! Google Custom Search JSON API provider.
//!
//! Requires an API key and a programmable search engine id. Results are
//! requested in pages of at most [`PAGE_SIZE`] until the requested count is
//! met, Google returns an empty page, or [`MAX_RESULTS`] is reached (the API
//! serves nothing past the first hundred hits).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::{build_client, check_status, timeout_ms};
use crate::config::{GoogleCredentials, SearchConfig};
use crate::error::{SearchError, SearchResult as Result};
use crate::types::{ProviderOutcome, SearchProvider, SearchResult};

pub const GOOGLE_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
pub const PAGE_SIZE: usize = 10;
pub const MAX_RESULTS: usize = 100;

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
}

#[derive(Debug, Deserialize)]
struct GoogleItem {
    title: Option<String>,
    link: Option<String>,
}

impl From<GoogleItem> for SearchResult {
    fn from(item: GoogleItem) -> Self {
        SearchResult {
            title: item.title,
            url: item.link,
        }
    }
}

/// Google Custom Search provider
#[derive(Debug, Clone)]
pub struct GoogleProvider {
    client: reqwest::Client,
    endpoint: String,
    credentials: Option<GoogleCredentials>,
    timeout: Duration,
}

impl GoogleProvider {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            client: build_client(config),
            endpoint: GOOGLE_ENDPOINT.to_string(),
            credentials: config.google.clone(),
            timeout: config.request_timeout(),
        }
    }

    /// Point the provider at a different base URL (used against mock servers).
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.endpoint = Url::parse(endpoint)?.to_string();
        Ok(self)
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    async fn fetch_page(
        &self,
        credentials: &GoogleCredentials,
        query: &str,
        start: usize,
        count: usize,
    ) -> Result<Vec<SearchResult>> {
        let num = count.to_string();
        let start = start.to_string();
        let timeout = timeout_ms(self.timeout);

        log::debug!("google: requesting {num} results starting at {start}");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", credentials.api_key.as_str()),
                ("cx", credentials.cse_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
                ("start", start.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SearchError::from_reqwest(e, timeout))?;

        let page: GoogleResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| SearchError::from_reqwest(e, timeout))?;

        Ok(page.items.into_iter().map(SearchResult::from).collect())
    }
}

#[async_trait]
impl SearchProvider for GoogleProvider {
    fn name(&self) -> &str {
        "Google"
    }

    async fn fetch(&self, query: &str, limit: usize) -> ProviderOutcome {
        let Some(credentials) = &self.credentials else {
            log::debug!("google: no credentials configured, skipping");
            return ProviderOutcome::Success(Vec::new());
        };

        let wanted = limit.min(MAX_RESULTS);
        let mut results: Vec<SearchResult> = Vec::with_capacity(wanted);
        let mut start = 1;

        while results.len() < wanted {
            let count = (wanted - results.len()).min(PAGE_SIZE);
            match self.fetch_page(credentials, query, start, count).await {
                Ok(page) if page.is_empty() => break,
                Ok(page) => {
                    start += page.len();
                    results.extend(page);
                }
                Err(error) => {
                    log::warn!("google: request failed after {} results: {error}", results.len());
                    return ProviderOutcome::Failure {
                        partial: results,
                        error,
                    };
                }
            }
        }

        results.truncate(wanted);
        log::debug!("google: collected {} results", results.len());
        ProviderOutcome::Success(results)
    }
}
