//! Relevance filter.

use crate::types::{FilteredHit, SearchHit};

/// Threshold applied when none is configured.
pub const DEFAULT_RELEVANCE_THRESHOLD: f32 = 0.7;

/// Keep the hits whose score is at or above `threshold`.
///
/// Order is preserved and nothing is re-ranked. An empty result is a normal
/// outcome. Hits with a NaN score never pass.
pub fn filter_hits(hits: Vec<SearchHit>, threshold: f32) -> Vec<FilteredHit> {
    let total = hits.len();
    let kept: Vec<FilteredHit> = hits
        .into_iter()
        .filter(|hit| hit.score >= threshold)
        .map(FilteredHit::new)
        .collect();

    tracing::debug!(
        "Relevance filter kept {} of {} hits (threshold {:.2})",
        kept.len(),
        total,
        threshold
    );

    kept
}
