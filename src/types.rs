//! Core types shared by providers, the aggregation pipeline and the tools

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// A single search hit as returned by the pipeline.
///
/// `url` is the identity used for deduplication. Entries without a url are
/// never treated as duplicates of anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: Option<String>,
    pub url: Option<String>,
}

impl SearchResult {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            url: Some(url.into()),
        }
    }

    /// Placeholder entry standing in for a provider that failed.
    pub fn failure(provider: &str, reason: &str) -> Self {
        Self {
            title: Some(format!("{provider} API failed: {reason}")),
            url: None,
        }
    }
}

/// What a provider produced for one query.
#[derive(Debug, Clone)]
pub enum ProviderOutcome {
    Success(Vec<SearchResult>),
    /// The provider failed part way. `partial` holds anything collected
    /// before the failure, in rank order.
    Failure {
        partial: Vec<SearchResult>,
        error: SearchError,
    },
}

impl ProviderOutcome {
    pub fn failed(error: SearchError) -> Self {
        ProviderOutcome::Failure {
            partial: Vec::new(),
            error,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProviderOutcome::Success(_))
    }

    /// Flatten into a ranked list, appending one sentinel entry on failure.
    pub fn into_results(self, provider: &str) -> Vec<SearchResult> {
        match self {
            ProviderOutcome::Success(results) => results,
            ProviderOutcome::Failure { mut partial, error } => {
                partial.push(SearchResult::failure(provider, &error.to_string()));
                partial
            }
        }
    }
}

/// A search backend queried by the aggregation pipeline.
#[async_trait]
pub trait SearchProvider: Send + Sync + std::fmt::Debug {
    /// Display name, also used in failure sentinels
    fn name(&self) -> &str;

    /// Fetch up to `limit` ranked results for `query`.
    ///
    /// Implementations must not fail: transport and decode errors are
    /// reported through [`ProviderOutcome::Failure`].
    async fn fetch(&self, query: &str, limit: usize) -> ProviderOutcome;
}
