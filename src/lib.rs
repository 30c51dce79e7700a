//! # th0rn0
//!
//! A small set of callable tools for a host tool runtime: a greeting, the
//! server clock, and a web search that aggregates Google Custom Search and
//! DuckDuckGo into one deduplicated, weighted-interleaved list.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use th0rn0::{SearchAggregator, SearchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SearchConfig::from_env()?;
//!     let search = SearchAggregator::from_config(&config)?;
//!
//!     for result in search.search("Rust programming language", 5).await? {
//!         println!(
//!             "{}: {}",
//!             result.title.unwrap_or_default(),
//!             result.url.unwrap_or_default()
//!         );
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! 1. Both providers are queried concurrently. A failing provider does not
//!    fail the search; it contributes a single entry titled
//!    `"<Provider> API failed: <reason>"` with no url.
//! 2. The two ranked lists are merged by [`WeightedInterleaver`]
//!    (70% Google, 30% DuckDuckGo by default).
//! 3. Entries with a url already seen are dropped.
//! 4. The list is truncated to the requested count and cached for the
//!    configured TTL.

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod dedup;
pub mod error;
pub mod interleave;
pub mod providers;
pub mod tools;
pub mod types;

// Re-export common types
pub use aggregator::SearchAggregator;
pub use cache::{CacheKey, CacheStats, TtlCache};
pub use config::{GoogleCredentials, SearchConfig};
pub use error::{SearchError, SearchResult as Result};
pub use interleave::WeightedInterleaver;
pub use tools::{tool_definitions, Toolbox, ToolDefinition};
pub use types::{ProviderOutcome, SearchProvider, SearchResult};
