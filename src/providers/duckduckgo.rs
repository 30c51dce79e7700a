//! DuckDuckGo Instant Answer API provider.
//!
//! No credentials needed. The API answers a single request; results come
//! from its `RelatedTopics` list, where a category entry contributes only
//! its first nested topic.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::{build_client, check_status, timeout_ms};
use crate::config::SearchConfig;
use crate::error::{SearchError, SearchResult as Result};
use crate::types::{ProviderOutcome, SearchProvider, SearchResult};

pub const DUCKDUCKGO_ENDPOINT: &str = "https://api.duckduckgo.com/";

#[derive(Debug, Deserialize)]
struct InstantAnswer {
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Deserialize)]
struct RelatedTopic {
    #[serde(rename = "Text")]
    text: Option<String>,
    #[serde(rename = "FirstURL")]
    first_url: Option<String>,
    #[serde(rename = "Topics")]
    topics: Option<Vec<RelatedTopic>>,
}

impl RelatedTopic {
    fn into_result(self) -> Option<SearchResult> {
        match (self.text, self.first_url, self.topics) {
            (Some(text), Some(url), _) => Some(SearchResult::new(text, url)),
            (_, _, Some(topics)) => topics.into_iter().next().and_then(|sub| match sub {
                RelatedTopic {
                    text: Some(text),
                    first_url: Some(url),
                    ..
                } => Some(SearchResult::new(text, url)),
                _ => None,
            }),
            _ => None,
        }
    }
}

/// DuckDuckGo provider
#[derive(Debug, Clone)]
pub struct DuckDuckGoProvider {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl DuckDuckGoProvider {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            client: build_client(config),
            endpoint: DUCKDUCKGO_ENDPOINT.to_string(),
            timeout: config.request_timeout(),
        }
    }

    /// Point the provider at a different base URL (used against mock servers).
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.endpoint = Url::parse(endpoint)?.to_string();
        Ok(self)
    }

    async fn fetch_topics(&self, query: &str) -> Result<Vec<SearchResult>> {
        let timeout = timeout_ms(self.timeout);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_redirect", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| SearchError::from_reqwest(e, timeout))?;

        // the API serves `application/x-javascript`, so decode the text ourselves
        let body = check_status(response)
            .await?
            .text()
            .await
            .map_err(|e| SearchError::from_reqwest(e, timeout))?;
        let answer: InstantAnswer = serde_json::from_str(&body)?;

        Ok(answer
            .related_topics
            .into_iter()
            .filter_map(RelatedTopic::into_result)
            .collect())
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    fn name(&self) -> &str {
        "DuckDuckGo"
    }

    /// The Instant Answer API has no paging, so `limit` is not applied here;
    /// the interleaver bounds how many of these results are used.
    async fn fetch(&self, query: &str, _limit: usize) -> ProviderOutcome {
        match self.fetch_topics(query).await {
            Ok(results) => {
                log::debug!("duckduckgo: collected {} results", results.len());
                ProviderOutcome::Success(results)
            }
            Err(error) => {
                log::warn!("duckduckgo: request failed: {error}");
                ProviderOutcome::failed(error)
            }
        }
    }
}
