//! Error types for the th0rn0 crate

use std::fmt;

/// Errors that can occur while fetching, aggregating or dispatching tools.
///
/// Provider failures never reach the caller of the search pipeline; they are
/// folded into a sentinel result. The variants still travel through
/// [`crate::types::ProviderOutcome`] so the failure reason stays typed until
/// the last moment.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    #[error("HTTP error{}: {message}", status_suffix(.status_code))]
    HttpError {
        status_code: Option<u16>,
        message: String,
        response_body: Option<String>,
    },

    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("failed to parse response: {0}")]
    ParseError(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("provider error: {0}")]
    ProviderError(String),

    #[error("{0}")]
    Other(String),
}

fn status_suffix(status_code: &Option<u16>) -> StatusSuffix {
    StatusSuffix(*status_code)
}

struct StatusSuffix(Option<u16>);

impl fmt::Display for StatusSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(code) => write!(f, " {code}"),
            None => Ok(()),
        }
    }
}

impl SearchError {
    /// Classify a `reqwest` failure, keeping the configured timeout for
    /// timeouts since `reqwest` does not report it.
    pub fn from_reqwest(error: reqwest::Error, timeout_ms: u64) -> Self {
        if error.is_timeout() {
            SearchError::Timeout { timeout_ms }
        } else if error.is_decode() {
            SearchError::ParseError(error.to_string())
        } else {
            SearchError::HttpError {
                status_code: error.status().map(|s| s.as_u16()),
                message: error.to_string(),
                response_body: None,
            }
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(error: serde_json::Error) -> Self {
        SearchError::ParseError(error.to_string())
    }
}

impl From<url::ParseError> for SearchError {
    fn from(error: url::ParseError) -> Self {
        SearchError::InvalidInput(format!("invalid URL: {error}"))
    }
}

/// Result alias used throughout the crate
pub type SearchResult<T> = std::result::Result<T, SearchError>;
