//! Retrieval data model: search hits, filtered hits and source sets.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Source identifier used when a passage carries none.
pub const MISSING_SOURCE: &str = "No URL available";

/// A passage returned by the vector search provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Passage text
    pub content: String,

    /// String metadata stored with the passage (source identifier among it)
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,

    /// Provider-defined relevance; higher is more relevant
    pub score: f32,
}

impl SearchHit {
    pub fn new(content: impl Into<String>, score: f32) -> Self {
        Self {
            content: content.into(),
            metadata: BTreeMap::new(),
            score,
        }
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The source identifier stored under `key`, if any. A blank value is
    /// still a value.
    pub fn source(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

/// A search hit that passed the relevance filter.
///
/// Only [`crate::filter::filter_hits`] creates these, so anything holding a
/// `FilteredHit` knows its score cleared the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredHit(SearchHit);

impl FilteredHit {
    pub(crate) fn new(hit: SearchHit) -> Self {
        Self(hit)
    }

    pub fn hit(&self) -> &SearchHit {
        &self.0
    }

    pub fn content(&self) -> &str {
        &self.0.content
    }

    pub fn score(&self) -> f32 {
        self.0.score
    }
}

/// Unique source identifiers of the passages behind an answer.
///
/// Duplicates collapse to one entry. Iteration follows first appearance so
/// the rendered list is stable for a given hit order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SourceSet {
    entries: Vec<String>,
    #[serde(skip)]
    seen: HashSet<String>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source; returns `false` if it was already present.
    pub fn insert(&mut self, source: impl Into<String>) -> bool {
        let source = source.into();
        if self.seen.contains(&source) {
            return false;
        }
        self.seen.insert(source.clone());
        self.entries.push(source);
        true
    }

    pub fn contains(&self, source: &str) -> bool {
        self.seen.contains(source)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Join the sources with `separator`.
    pub fn join(&self, separator: &str) -> String {
        self.entries.join(separator)
    }
}

impl std::fmt::Display for SourceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.join(", "))
    }
}

impl<S: Into<String>> FromIterator<S> for SourceSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for source in iter {
            set.insert(source);
        }
        set
    }
}
