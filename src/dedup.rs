//! URL-based deduplication.

use std::collections::HashSet;

use crate::types::SearchResult;

/// Keep the first occurrence of every url, preserving encounter order.
///
/// Entries without a url have no identity and are always kept, including
/// several of them in a row.
pub fn deduplicate(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen: HashSet<String> = HashSet::with_capacity(results.len());
    results
        .into_iter()
        .filter(|result| match &result.url {
            Some(url) => seen.insert(url.clone()),
            None => true,
        })
        .collect()
}
