//! Search provider implementations

pub mod duckduckgo;
pub mod google;

// Re-export providers for convenience
pub use duckduckgo::DuckDuckGoProvider;
pub use google::GoogleProvider;

use std::time::Duration;

use crate::config::SearchConfig;

const DEFAULT_USER_AGENT: &str = concat!("th0rn0/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by a provider's requests.
///
/// Falls back to a default client if the builder rejects the settings, so
/// constructing a provider never fails.
pub(crate) fn build_client(config: &SearchConfig) -> reqwest::Client {
    let user_agent = config
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

    reqwest::Client::builder()
        .timeout(config.request_timeout())
        .user_agent(user_agent)
        .build()
        .unwrap_or_else(|err| {
            log::warn!("failed to build configured HTTP client, using defaults: {err}");
            reqwest::Client::new()
        })
}

pub(crate) fn timeout_ms(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

/// Turn a non-success response into an error carrying its status and body.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> crate::error::SearchResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.ok().filter(|b| !b.is_empty());
    Err(crate::error::SearchError::HttpError {
        status_code: Some(status.as_u16()),
        message: status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string(),
        response_body: body,
    })
}
