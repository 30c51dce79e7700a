//! Integration tests for the th0rn0 search pipeline
//!
//! These tests cover the aggregation properties, provider outages and the
//! real provider clients running against mock HTTP servers.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use th0rn0::cache::ManualClock;
use th0rn0::providers::{DuckDuckGoProvider, GoogleProvider};
use th0rn0::{
    GoogleCredentials, ProviderOutcome, SearchAggregator, SearchConfig, SearchError,
    SearchProvider, SearchResult, Toolbox,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// Mock provider that can be configured for various test scenarios
#[derive(Debug, Clone)]
struct TestProvider {
    name: String,
    behavior: TestProviderBehavior,
    call_count: Arc<AtomicUsize>,
}

#[derive(Debug, Clone)]
enum TestProviderBehavior {
    Success(Vec<SearchResult>),
    Error(SearchError),
    Slow {
        delay_ms: u64,
        then: Vec<SearchResult>,
    },
}

impl TestProvider {
    fn new(name: &str, behavior: TestProviderBehavior) -> Self {
        Self {
            name: name.to_string(),
            behavior,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn success(name: &str, results: Vec<SearchResult>) -> Self {
        Self::new(name, TestProviderBehavior::Success(results))
    }

    fn error(name: &str, error: SearchError) -> Self {
        Self::new(name, TestProviderBehavior::Error(error))
    }

    fn calls(&self) -> Arc<AtomicUsize> {
        self.call_count.clone()
    }
}

#[async_trait]
impl SearchProvider for TestProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, _query: &str, _limit: usize) -> ProviderOutcome {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            TestProviderBehavior::Success(results) => ProviderOutcome::Success(results.clone()),
            TestProviderBehavior::Error(error) => ProviderOutcome::failed(error.clone()),
            TestProviderBehavior::Slow { delay_ms, then } => {
                tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                ProviderOutcome::Success(then.clone())
            }
        }
    }
}

// Helper function to create test search results
fn create_test_results(provider: &str, count: usize) -> Vec<SearchResult> {
    (1..=count)
        .map(|i| {
            SearchResult::new(
                format!("{provider} Result {i}"),
                format!("https://{provider}.com/result/{i}"),
            )
        })
        .collect()
}

fn aggregator_with(primary: TestProvider, secondary: TestProvider, seed: u64) -> SearchAggregator {
    SearchAggregator::new(Box::new(primary), Box::new(secondary), &SearchConfig::default())
        .with_rng(StdRng::seed_from_u64(seed))
}

fn position(results: &[SearchResult], url: &str) -> usize {
    results
        .iter()
        .position(|r| r.url.as_deref() == Some(url))
        .unwrap_or_else(|| panic!("{url} missing from results"))
}

#[tokio::test]
async fn end_to_end_three_results_keep_source_order() {
    for seed in 0..16 {
        let primary = TestProvider::success(
            "A",
            vec![SearchResult::new("1", "u1"), SearchResult::new("2", "u2")],
        );
        let secondary = TestProvider::success("B", vec![SearchResult::new("3", "u3")]);
        let aggregator = aggregator_with(primary, secondary, seed);

        let results = aggregator.search("query", 3).await.unwrap();

        assert_eq!(results.len(), 3, "seed {seed}");
        let urls: HashSet<_> = results.iter().filter_map(|r| r.url.as_deref()).collect();
        assert_eq!(urls, HashSet::from(["u1", "u2", "u3"]));
        assert!(position(&results, "u1") < position(&results, "u2"));
    }
}

#[tokio::test]
async fn results_bounded_and_unique_for_many_counts() {
    let mut shared = create_test_results("shared", 5);
    shared.extend(create_test_results("a", 10));
    let mut other = create_test_results("shared", 5);
    other.extend(create_test_results("b", 10));

    let aggregator = aggregator_with(
        TestProvider::success("A", shared),
        TestProvider::success("B", other),
        11,
    );

    for n in [0, 1, 5, 20, 30, 100] {
        let results = aggregator.search("overlap", n).await.unwrap();
        assert!(results.len() <= n);

        let urls: Vec<_> = results.iter().filter_map(|r| r.url.clone()).collect();
        let unique: HashSet<_> = urls.iter().collect();
        assert_eq!(unique.len(), urls.len(), "duplicate url for n={n}");
    }
}

#[tokio::test]
async fn primary_outage_yields_secondary_plus_sentinel() {
    let primary = TestProvider::error("Google", SearchError::Timeout { timeout_ms: 5000 });
    let secondary = TestProvider::success("DuckDuckGo", create_test_results("ddg", 3));
    let aggregator = aggregator_with(primary, secondary, 5);

    let results = aggregator.search("rust", 20).await.unwrap();

    assert_eq!(results.len(), 4);
    let sentinels: Vec<_> = results.iter().filter(|r| r.url.is_none()).collect();
    assert_eq!(sentinels.len(), 1);
    assert_eq!(
        sentinels[0].title.as_deref(),
        Some("Google API failed: request timed out after 5000ms")
    );
}

#[tokio::test]
async fn both_providers_failing_returns_two_sentinels() {
    let primary = TestProvider::error(
        "Google",
        SearchError::HttpError {
            status_code: Some(403),
            message: "Forbidden".to_string(),
            response_body: None,
        },
    );
    let secondary = TestProvider::error("DuckDuckGo", SearchError::ParseError("bad json".into()));
    let aggregator = aggregator_with(primary, secondary, 9);

    let results = aggregator.search("rust", 20).await.unwrap();

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.url.is_none()));
}

#[tokio::test]
async fn cached_within_ttl_and_refetched_after() {
    let primary = TestProvider::success("A", create_test_results("a", 3));
    let secondary = TestProvider::success("B", create_test_results("b", 3));
    let primary_calls = primary.calls();
    let secondary_calls = secondary.calls();

    let clock = ManualClock::new();
    let config = SearchConfig {
        cache_ttl_seconds: 60,
        ..Default::default()
    };
    let aggregator = SearchAggregator::with_clock(
        Box::new(primary),
        Box::new(secondary),
        &config,
        Arc::new(clock.clone()),
    );

    let first = aggregator.search("cached", 4).await.unwrap();
    let second = aggregator.search("cached", 4).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
    assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);

    clock.advance(Duration::from_secs(61));
    aggregator.search("cached", 4).await.unwrap();
    assert_eq!(primary_calls.load(Ordering::SeqCst), 2);
    assert_eq!(secondary_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn cache_capacity_evicts_oldest_query() {
    let primary = TestProvider::success("A", create_test_results("a", 2));
    let calls = primary.calls();
    let config = SearchConfig {
        cache_max_entries: 2,
        ..Default::default()
    };
    let aggregator = SearchAggregator::new(
        Box::new(primary),
        Box::new(TestProvider::success("B", vec![])),
        &config,
    );

    for query in ["one", "two", "three", "one"] {
        aggregator.search(query, 2).await.unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(aggregator.cache_stats().evicted, 2);
}

#[tokio::test]
async fn slow_providers_are_fetched_concurrently() {
    let primary = TestProvider::new(
        "A",
        TestProviderBehavior::Slow {
            delay_ms: 200,
            then: create_test_results("a", 2),
        },
    );
    let secondary = TestProvider::new(
        "B",
        TestProviderBehavior::Slow {
            delay_ms: 200,
            then: create_test_results("b", 2),
        },
    );
    let aggregator = aggregator_with(primary, secondary, 1);

    let started = std::time::Instant::now();
    let results = aggregator.search("slow", 4).await.unwrap();

    assert_eq!(results.len(), 4);
    assert!(started.elapsed() < Duration::from_millis(390));
}

#[tokio::test]
async fn search_with_unicode_query() {
    let aggregator = aggregator_with(
        TestProvider::success("unicode", create_test_results("unicode", 2)),
        TestProvider::success("other", vec![]),
        2,
    );

    let results = aggregator
        .search("🔍 search emoji 中文 العربية русский", 10)
        .await
        .unwrap();
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn toolbox_web_search_end_to_end() {
    let toolbox = Toolbox::new(aggregator_with(
        TestProvider::success("A", create_test_results("a", 3)),
        TestProvider::success("B", create_test_results("b", 3)),
        4,
    ));

    let value = toolbox
        .call("web_search", json!({ "num_results": 4, "query": "tools" }))
        .await
        .unwrap();

    let results: Vec<SearchResult> = serde_json::from_value(value).unwrap();
    assert_eq!(results.len(), 4);
}

// Real provider clients against mock servers

fn mock_config() -> SearchConfig {
    SearchConfig {
        request_timeout_seconds: 1,
        ..Default::default()
    }
    .with_google(GoogleCredentials::new("key", "cx"))
}

async fn duckduckgo_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "RelatedTopics": [
                { "Text": "Rust", "FirstURL": "https://duckduckgo.com/Rust" },
                { "Text": "Shared", "FirstURL": "https://shared.example/page" },
                { "Name": "More", "Topics": [
                    { "Text": "Ferris", "FirstURL": "https://duckduckgo.com/Ferris" }
                ]}
            ]
        })))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn google_timeout_degrades_to_duckduckgo_results() {
    let google = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "items": [] }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&google)
        .await;
    let ddg = duckduckgo_server().await;

    let config = mock_config();
    let aggregator = SearchAggregator::new(
        Box::new(
            GoogleProvider::new(&config)
                .with_endpoint(&format!("{}/customsearch/v1", google.uri()))
                .unwrap(),
        ),
        Box::new(DuckDuckGoProvider::new(&config).with_endpoint(&ddg.uri()).unwrap()),
        &config,
    )
    .with_rng(StdRng::seed_from_u64(8));

    let results = aggregator.search("rust", 20).await.unwrap();

    assert_eq!(results.len(), 4);
    let sentinel: Vec<_> = results.iter().filter(|r| r.url.is_none()).collect();
    assert_eq!(sentinel.len(), 1);
    assert!(sentinel[0]
        .title
        .as_deref()
        .unwrap()
        .starts_with("Google API failed: request timed out"));
}

#[tokio::test]
async fn shared_urls_across_real_providers_are_deduplicated() {
    let google = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "title": "Shared (Google)", "link": "https://shared.example/page" },
                { "title": "Rust docs", "link": "https://doc.rust-lang.org/" }
            ]
        })))
        .mount(&google)
        .await;
    let ddg = duckduckgo_server().await;

    let config = mock_config();
    let aggregator = SearchAggregator::new(
        Box::new(
            GoogleProvider::new(&config)
                .with_endpoint(&format!("{}/customsearch/v1", google.uri()))
                .unwrap(),
        ),
        Box::new(DuckDuckGoProvider::new(&config).with_endpoint(&ddg.uri()).unwrap()),
        &config,
    )
    .with_rng(StdRng::seed_from_u64(21));

    let results = aggregator.search("rust", 20).await.unwrap();

    let urls: Vec<_> = results.iter().filter_map(|r| r.url.as_deref()).collect();
    assert_eq!(urls.len(), 4);
    assert_eq!(
        urls.iter().filter(|u| **u == "https://shared.example/page").count(),
        1
    );
}

#[tokio::test]
async fn unconfigured_google_makes_no_requests() {
    let google = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(0)
        .mount(&google)
        .await;
    let ddg = duckduckgo_server().await;

    let config = SearchConfig::default();
    let aggregator = SearchAggregator::new(
        Box::new(GoogleProvider::new(&config).with_endpoint(&google.uri()).unwrap()),
        Box::new(DuckDuckGoProvider::new(&config).with_endpoint(&ddg.uri()).unwrap()),
        &config,
    );

    let results = aggregator.search("rust", 20).await.unwrap();
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.url.is_some()));
}
