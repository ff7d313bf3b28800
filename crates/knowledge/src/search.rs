//! Vector search abstraction.

use crate::types::SearchHit;
use docqa_core::AppResult;

/// Nearest-k passage search with relevance scores.
///
/// Implementations embed the query with the same model the index was built
/// with and return at most `k` hits, most relevant first.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Backend name for logging (e.g., "lancedb").
    fn name(&self) -> &str;

    /// Search for the `k` passages closest to `query`.
    async fn search(&self, query: &str, k: usize) -> AppResult<Vec<SearchHit>>;
}
