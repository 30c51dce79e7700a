//! Search aggregation pipeline.
//!
//! Fetches a primary and a secondary provider concurrently, merges their
//! ranked lists with [`WeightedInterleaver`], removes duplicate urls and
//! truncates to the requested count. Whole pipeline results are memoized in
//! a [`TtlCache`] keyed on `(query, num_results)`.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::cache::{CacheKey, CacheStats, Clock, SystemClock, TtlCache};
use crate::config::SearchConfig;
use crate::dedup::deduplicate;
use crate::error::{SearchError, SearchResult as Result};
use crate::interleave::WeightedInterleaver;
use crate::providers::{DuckDuckGoProvider, GoogleProvider};
use crate::types::{SearchProvider, SearchResult};

/// Cached two-provider search.
pub struct SearchAggregator {
    primary: Box<dyn SearchProvider>,
    secondary: Box<dyn SearchProvider>,
    interleaver: WeightedInterleaver,
    cache: TtlCache<CacheKey, Vec<SearchResult>>,
    rng: Mutex<Box<dyn RngCore + Send>>,
    default_num_results: usize,
}

impl fmt::Debug for SearchAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchAggregator")
            .field("primary", &self.primary)
            .field("secondary", &self.secondary)
            .field("interleaver", &self.interleaver)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl SearchAggregator {
    /// Google as the primary source, DuckDuckGo as the secondary.
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            Box::new(GoogleProvider::new(config)),
            Box::new(DuckDuckGoProvider::new(config)),
            config,
        ))
    }

    pub fn new(
        primary: Box<dyn SearchProvider>,
        secondary: Box<dyn SearchProvider>,
        config: &SearchConfig,
    ) -> Self {
        Self::with_clock(primary, secondary, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        primary: Box<dyn SearchProvider>,
        secondary: Box<dyn SearchProvider>,
        config: &SearchConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            primary,
            secondary,
            interleaver: WeightedInterleaver::new(config.google_weight, config.duckduckgo_weight),
            cache: TtlCache::with_clock(config.cache_ttl(), config.cache_max_entries, clock),
            rng: Mutex::new(Box::new(StdRng::from_entropy())),
            default_num_results: config.default_num_results,
        }
    }

    /// Replace the random source used for interleaving.
    pub fn with_rng(self, rng: impl RngCore + Send + 'static) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
            ..self
        }
    }

    pub fn default_num_results(&self) -> usize {
        self.default_num_results
    }

    /// Aggregated results for `query`, at most `num_results` long, with no
    /// repeated url. Served from the cache while fresh.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidInput`] for a blank query. Provider
    /// failures never surface here; they appear as a result without a url.
    pub async fn search(&self, query: &str, num_results: usize) -> Result<Vec<SearchResult>> {
        if query.trim().is_empty() {
            return Err(SearchError::InvalidInput(
                "A search query is required".to_string(),
            ));
        }

        let key = CacheKey::new().arg(query).arg(num_results);
        log::debug!("search {key}");

        self.cache
            .get_or_try_insert_with(key, || self.run_pipeline(query, num_results))
            .await
    }

    async fn run_pipeline(&self, query: &str, num_results: usize) -> Result<Vec<SearchResult>> {
        let (primary, secondary) = futures::future::join(
            self.primary.fetch(query, num_results),
            self.secondary.fetch(query, num_results),
        )
        .await;

        let primary = primary.into_results(self.primary.name());
        let secondary = secondary.into_results(self.secondary.name());
        log::debug!(
            "{} returned {} entries, {} returned {}",
            self.primary.name(),
            primary.len(),
            self.secondary.name(),
            secondary.len()
        );

        let merged = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            self.interleaver
                .interleave(primary, secondary, num_results, &mut **rng)
        };

        let mut results = deduplicate(merged);
        results.truncate(num_results);

        log::info!("search produced {} results", results.len());
        Ok(results)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
