//! Context aggregation: passages into one context block plus their sources.

use crate::types::{FilteredHit, SourceSet, MISSING_SOURCE};

/// Separator placed between passages in the context block.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Join the passages (in order) and collect their unique sources.
///
/// A hit with no `source_key` entry contributes [`MISSING_SOURCE`]; a blank
/// entry is kept as is. Content is always kept.
pub fn aggregate(hits: &[FilteredHit], source_key: &str) -> (String, SourceSet) {
    let mut sources = SourceSet::new();
    let mut passages = Vec::with_capacity(hits.len());

    for hit in hits {
        passages.push(hit.content());
        sources.insert(hit.hit().source(source_key).unwrap_or(MISSING_SOURCE));
    }

    let context = passages.join(CONTEXT_SEPARATOR);

    tracing::debug!(
        "Aggregated {} passages ({} bytes) from {} sources",
        hits.len(),
        context.len(),
        sources.len()
    );

    (context, sources)
}
