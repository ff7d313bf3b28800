//! Retrieval and grounded answering.
//!
//! Turns a question into a grounded answer: vector search over a LanceDB
//! index, relevance filtering, context aggregation and the query
//! orchestrator that ties them to the prompt builder and the answer service.

pub mod aggregate;
pub mod embeddings;
pub mod filter;
pub mod lancedb_search;
pub mod rag;
pub mod search;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use aggregate::{aggregate, CONTEXT_SEPARATOR};
pub use embeddings::{create_embedding_provider, EmbeddingProvider, OpenAiEmbeddings};
pub use filter::{filter_hits, DEFAULT_RELEVANCE_THRESHOLD};
pub use lancedb_search::LanceDbSearch;
pub use rag::{GroundedAnswer, QueryOrchestrator, QueryOutcome, NO_RESULT_MESSAGE};
pub use search::SearchProvider;
pub use types::{FilteredHit, SearchHit, SourceSet, MISSING_SOURCE};
