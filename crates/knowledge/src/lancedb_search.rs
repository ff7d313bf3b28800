//! LanceDB-backed passage search.
//!
//! Opens an existing table read-only. Each row carries the passage text, its
//! embedding and any number of string metadata columns; a JSON-encoded
//! metadata column is flattened into the same map.

use crate::embeddings::EmbeddingProvider;
use crate::search::SearchProvider;
use crate::types::SearchHit;
use arrow_array::{
    Array, FixedSizeListArray, Float32Array, LargeStringArray, RecordBatch, StringArray,
};
use arrow_schema::DataType;
use docqa_core::config::IndexConfig;
use docqa_core::{AppError, AppResult};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{DistanceType, Table};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Vector search over a LanceDB table.
pub struct LanceDbSearch {
    table: Table,
    embedder: Arc<dyn EmbeddingProvider>,
    layout: IndexConfig,
}

impl LanceDbSearch {
    /// Open the table described by `config`.
    ///
    /// The index is never created here; a missing database or table is a
    /// search error.
    pub async fn open(config: &IndexConfig, embedder: Arc<dyn EmbeddingProvider>) -> AppResult<Self> {
        if !config.path.exists() {
            return Err(AppError::Search(format!(
                "Vector index not found at {:?}. Build the index before asking questions.",
                config.path
            )));
        }

        let uri = config.path.to_string_lossy().to_string();
        let conn = lancedb::connect(&uri)
            .execute()
            .await
            .map_err(|e| AppError::Search(format!("Failed to connect to LanceDB: {}", e)))?;

        let table_names = conn
            .table_names()
            .execute()
            .await
            .map_err(|e| AppError::Search(format!("Failed to list tables: {}", e)))?;

        if !table_names.iter().any(|name| name == &config.table) {
            return Err(AppError::Search(format!(
                "Table '{}' not found in {:?}. Build the index before asking questions.",
                config.table, config.path
            )));
        }

        let table = conn
            .open_table(&config.table)
            .execute()
            .await
            .map_err(|e| AppError::Search(format!("Failed to open table: {}", e)))?;

        tracing::debug!("Opened LanceDB table '{}' at {:?}", config.table, config.path);

        Ok(Self {
            table,
            embedder,
            layout: config.clone(),
        })
    }

    async fn nearest(&self, query_vec: Vec<f32>, k: usize) -> AppResult<Vec<RecordBatch>> {
        self.table
            .query()
            .nearest_to(query_vec)
            .map_err(|e| AppError::Search(format!("Failed to create query: {}", e)))?
            .column(&self.layout.vector_column)
            .distance_type(DistanceType::Cosine)
            .limit(k)
            .execute()
            .await
            .map_err(|e| AppError::Search(format!("Failed to execute search: {}", e)))?
            .try_collect::<Vec<_>>()
            .await
            .map_err(|e| AppError::Search(format!("Failed to collect results: {}", e)))
    }

    /// Convert one result row into a hit scored against `query_vec`.
    fn row_to_hit(&self, batch: &RecordBatch, row: usize, query_vec: &[f32]) -> AppResult<SearchHit> {
        let text_column = batch
            .column_by_name(&self.layout.text_column)
            .ok_or_else(|| {
                AppError::Search(format!("Missing text column '{}'", self.layout.text_column))
            })?;
        let content = string_at(text_column.as_ref(), row)
            .ok_or_else(|| AppError::Search("Row has no passage text".to_string()))?;

        let vectors = batch
            .column_by_name(&self.layout.vector_column)
            .and_then(|col| col.as_any().downcast_ref::<FixedSizeListArray>())
            .ok_or_else(|| {
                AppError::Search(format!(
                    "Invalid vector column '{}'",
                    self.layout.vector_column
                ))
            })?;

        if vectors.is_null(row) {
            return Err(AppError::Search("Row has no embedding".to_string()));
        }

        let values_ref = vectors.value(row);
        let values = values_ref
            .as_any()
            .downcast_ref::<Float32Array>()
            .ok_or_else(|| AppError::Search("Invalid embedding values".to_string()))?;
        let embedding: Vec<f32> = values.values().to_vec();

        Ok(SearchHit {
            content,
            metadata: self.row_metadata(batch, row),
            score: relevance_from_cosine(cosine_similarity(query_vec, &embedding)),
        })
    }

    /// String columns other than text/vector, plus the JSON metadata column.
    ///
    /// A top-level column wins over a JSON entry with the same key.
    fn row_metadata(&self, batch: &RecordBatch, row: usize) -> BTreeMap<String, String> {
        let mut metadata = BTreeMap::new();
        let schema = batch.schema();

        for (idx, field) in schema.fields().iter().enumerate() {
            let name = field.name();
            if name == &self.layout.text_column || name == &self.layout.vector_column {
                continue;
            }
            if !matches!(field.data_type(), DataType::Utf8 | DataType::LargeUtf8) {
                continue;
            }
            let Some(value) = string_at(batch.column(idx).as_ref(), row) else {
                continue;
            };

            if name == &self.layout.metadata_column {
                merge_json_metadata(&value, &mut metadata);
            } else {
                metadata.insert(name.clone(), value);
            }
        }

        metadata
    }
}

#[async_trait::async_trait]
impl SearchProvider for LanceDbSearch {
    fn name(&self) -> &str {
        "lancedb"
    }

    async fn search(&self, query: &str, k: usize) -> AppResult<Vec<SearchHit>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_vec = self.embedder.embed(query).await?;
        let batches = self.nearest(query_vec.clone(), k).await?;

        let mut hits = Vec::new();
        for batch in &batches {
            for row in 0..batch.num_rows() {
                match self.row_to_hit(batch, row, &query_vec) {
                    Ok(hit) => hits.push(hit),
                    Err(e) => tracing::warn!("Skipping result row {}: {}", row, e),
                }
            }
        }

        sort_by_relevance(&mut hits);
        hits.truncate(k);

        tracing::debug!("Retrieved {} hits (requested top-{})", hits.len(), k);
        Ok(hits)
    }
}

fn string_at(array: &dyn Array, row: usize) -> Option<String> {
    if array.is_null(row) {
        return None;
    }
    if let Some(strings) = array.as_any().downcast_ref::<StringArray>() {
        return Some(strings.value(row).to_string());
    }
    array
        .as_any()
        .downcast_ref::<LargeStringArray>()
        .map(|strings| strings.value(row).to_string())
}

/// Flatten scalar entries of a JSON object into `metadata`.
fn merge_json_metadata(raw: &str, metadata: &mut BTreeMap<String, String>) {
    let parsed: serde_json::Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Ignoring unparsable metadata: {}", e);
            return;
        }
    };

    let Some(object) = parsed.as_object() else {
        return;
    };

    for (key, value) in object {
        let text = match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            _ => continue,
        };
        metadata.entry(key.clone()).or_insert(text);
    }
}

/// Descending by score. Stable, so ties keep the store's order.
fn sort_by_relevance(hits: &mut [SearchHit]) {
    hits.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Map cosine similarity onto the relevance scale of a squared-L2 index.
///
/// For unit vectors the squared L2 distance is `2 - 2c`; relevance is
/// `1 - d / √2`, capped at 1. Orthogonal vectors score below zero.
fn relevance_from_cosine(cosine: f32) -> f32 {
    let distance = 2.0 - 2.0 * cosine;
    (1.0 - distance / std::f32::consts::SQRT_2).min(1.0)
}

/// Calculate cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::RecordBatchIterator;
    use arrow_schema::{Field, Schema};
    use tempfile::TempDir;

    /// Embeds every query onto the first axis.
    struct AxisEmbedder;

    #[async_trait::async_trait]
    impl EmbeddingProvider for AxisEmbedder {
        fn provider_name(&self) -> &str {
            "axis"
        }

        fn model_name(&self) -> &str {
            "axis-v1"
        }

        async fn embed(&self, _text: &str) -> AppResult<Vec<f32>> {
            Ok(vec![1.0, 0.0, 0.0])
        }
    }

    fn layout(path: &std::path::Path) -> IndexConfig {
        IndexConfig {
            path: path.to_path_buf(),
            ..IndexConfig::default()
        }
    }

    async fn seed_index(config: &IndexConfig) {
        let schema = Arc::new(Schema::new(vec![
            Field::new("text", DataType::Utf8, false),
            Field::new("url", DataType::Utf8, true),
            Field::new("metadata", DataType::Utf8, true),
            Field::new(
                "vector",
                DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), 3),
                false,
            ),
        ]));

        let vectors = FixedSizeListArray::new(
            Arc::new(Field::new("item", DataType::Float32, true)),
            3,
            Arc::new(Float32Array::from(vec![
                0.0, 1.0, 0.0, // unrelated
                1.0, 0.0, 0.0, // exact
                0.8, 0.6, 0.0, // close
            ])),
            None,
        );

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["Andet emne", "Parkering er gratis", "Kantinen åbner 11"])),
                Arc::new(StringArray::from(vec![None, Some("https://intra/parkering"), Some("https://intra/kantine")])),
                Arc::new(StringArray::from(vec![
                    None,
                    Some("not json"),
                    Some(r#"{"title": "Kantine", "page": 3, "url": "https://other", "tags": ["a"]}"#),
                ])),
                Arc::new(vectors),
            ],
        )
        .unwrap();

        let conn = lancedb::connect(&config.path.to_string_lossy())
            .execute()
            .await
            .unwrap();
        conn.create_table(&config.table, RecordBatchIterator::new(vec![Ok(batch)], schema))
            .execute()
            .await
            .unwrap();
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_relevance_from_cosine() {
        assert!((relevance_from_cosine(1.0) - 1.0).abs() < 1e-6);
        assert!((relevance_from_cosine(0.9) - 0.858_579).abs() < 1e-5);
        assert!((relevance_from_cosine(0.75) - 0.646_447).abs() < 1e-5);
        assert!((relevance_from_cosine(0.0) + 0.414_214).abs() < 1e-5);
        assert!(relevance_from_cosine(1.000_01) <= 1.0);
    }

    #[test]
    fn test_sort_by_relevance_keeps_nan_hits() {
        let hit = |content: &str, score: f32| SearchHit {
            content: content.to_string(),
            metadata: BTreeMap::new(),
            score,
        };
        let mut hits = vec![hit("low", 0.2), hit("nan", f32::NAN), hit("high", 0.9), hit("mid", 0.5)];

        sort_by_relevance(&mut hits);

        assert_eq!(hits.len(), 4);
        let ranked: Vec<&str> = hits
            .iter()
            .filter(|h| !h.score.is_nan())
            .map(|h| h.content.as_str())
            .collect();
        assert_eq!(ranked, vec!["high", "mid", "low"]);
        assert!(hits.iter().any(|h| h.content == "nan"));
    }

    #[test]
    fn test_merge_json_metadata() {
        let mut metadata = BTreeMap::new();
        metadata.insert("url".to_string(), "https://kept".to_string());

        merge_json_metadata(
            r#"{"url": "https://ignored", "page": 2, "draft": false, "nested": {"a": 1}}"#,
            &mut metadata,
        );

        assert_eq!(metadata["url"], "https://kept");
        assert_eq!(metadata["page"], "2");
        assert_eq!(metadata["draft"], "false");
        assert!(!metadata.contains_key("nested"));

        merge_json_metadata("[1, 2]", &mut metadata);
        merge_json_metadata("{broken", &mut metadata);
        assert_eq!(metadata.len(), 3);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_open_missing_path() {
        let temp = TempDir::new().unwrap();
        let config = layout(&temp.path().join("nowhere"));

        let result = LanceDbSearch::open(&config, Arc::new(AxisEmbedder)).await;
        assert!(matches!(result, Err(AppError::Search(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_open_missing_table() {
        let temp = TempDir::new().unwrap();
        let config = layout(temp.path());

        let err = LanceDbSearch::open(&config, Arc::new(AxisEmbedder))
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_search_scores_and_metadata() {
        let temp = TempDir::new().unwrap();
        let config = layout(&temp.path().join("index"));
        std::fs::create_dir_all(&config.path).unwrap();
        seed_index(&config).await;

        let search = LanceDbSearch::open(&config, Arc::new(AxisEmbedder)).await.unwrap();
        let hits = search.search("Hvor kan jeg parkere?", 3).await.unwrap();

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].content, "Parkering er gratis");
        assert!((hits[0].score - 1.0).abs() < 1e-5);
        assert_eq!(hits[0].source("url"), Some("https://intra/parkering"));

        assert_eq!(hits[1].content, "Kantinen åbner 11");
        assert!((hits[1].score - 0.717_157).abs() < 1e-5);
        assert_eq!(hits[1].source("url"), Some("https://intra/kantine"));
        assert_eq!(hits[1].metadata["title"], "Kantine");
        assert_eq!(hits[1].metadata["page"], "3");

        assert_eq!(hits[2].content, "Andet emne");
        assert!((hits[2].score + 0.414_214).abs() < 1e-5);
        assert!(hits[2].metadata.is_empty());

        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_default_threshold_rejects_moderate_similarity() {
        let temp = TempDir::new().unwrap();
        let config = layout(&temp.path().join("index"));
        std::fs::create_dir_all(&config.path).unwrap();

        let schema = Arc::new(Schema::new(vec![
            Field::new("text", DataType::Utf8, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), 3),
                false,
            ),
        ]));
        let vectors = FixedSizeListArray::new(
            Arc::new(Field::new("item", DataType::Float32, true)),
            3,
            Arc::new(Float32Array::from(vec![
                0.9, 0.435_889_9, 0.0, // cosine 0.9
                0.75, 0.661_437_8, 0.0, // cosine 0.75
            ])),
            None,
        );
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["Tæt på", "Lidt relateret"])),
                Arc::new(vectors),
            ],
        )
        .unwrap();
        let conn = lancedb::connect(&config.path.to_string_lossy())
            .execute()
            .await
            .unwrap();
        conn.create_table(&config.table, RecordBatchIterator::new(vec![Ok(batch)], schema))
            .execute()
            .await
            .unwrap();

        let search = LanceDbSearch::open(&config, Arc::new(AxisEmbedder)).await.unwrap();
        let hits = search.search("q", 3).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert!(hits[0].score > 0.7);
        assert!(hits[1].score < 0.7);

        let kept = crate::filter::filter_hits(hits, crate::filter::DEFAULT_RELEVANCE_THRESHOLD);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].content(), "Tæt på");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_search_respects_k() {
        let temp = TempDir::new().unwrap();
        let config = layout(&temp.path().join("index"));
        std::fs::create_dir_all(&config.path).unwrap();
        seed_index(&config).await;

        let search = LanceDbSearch::open(&config, Arc::new(AxisEmbedder)).await.unwrap();

        let hits = search.search("q", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].content, "Parkering er gratis");

        assert!(search.search("q", 0).await.unwrap().is_empty());
    }
}
