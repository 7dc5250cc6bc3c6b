//! Exact, in-process embedding store.

use std::collections::BTreeSet;

use async_trait::async_trait;

use super::{EmbeddingStore, NeighborQuery};
use crate::embeddings::{ArticleRecord, SimilarityMetric};
use crate::error::StoreError;

/// Embedding store backed by a `Vec`, ranking every record on each query.
///
/// Ties keep insertion order and NaN scores rank last. `num_candidates` and `exact` are ignored since
/// the scan is always exhaustive.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<ArticleRecord>,
    metric: SimilarityMetric,
}

impl MemoryStore {
    /// Builds a cosine-ranked store from `records`.
    pub fn new(records: Vec<ArticleRecord>) -> Self {
        Self::with_metric(records, SimilarityMetric::Cosine)
    }

    /// Builds a store ranking by `metric`.
    pub fn with_metric(records: Vec<ArticleRecord>, metric: SimilarityMetric) -> Self {
        Self { records, metric }
    }

    fn dimensions(&self) -> Option<usize> {
        self.records
            .iter()
            .find_map(|record| record.embedding.as_ref().map(Vec::len))
    }
}

#[async_trait]
impl EmbeddingStore for MemoryStore {
    async fn titles(&self) -> Result<Vec<String>, StoreError> {
        let unique: BTreeSet<&str> = self
            .records
            .iter()
            .map(|record| record.title.as_str())
            .collect();
        Ok(unique.into_iter().map(str::to_string).collect())
    }

    async fn embedding_for(&self, title: &str) -> Result<Option<Vec<f32>>, StoreError> {
        Ok(self
            .records
            .iter()
            .find(|record| record.title == title)
            .and_then(|record| record.embedding.clone()))
    }

    async fn nearest(
        &self,
        vector: &[f32],
        query: NeighborQuery,
    ) -> Result<Vec<String>, StoreError> {
        if query.limit == 0 {
            return Ok(Vec::new());
        }
        if let Some(expected) = self.dimensions() {
            if expected != vector.len() {
                return Err(StoreError::DimensionMismatch {
                    expected,
                    got: vector.len(),
                });
            }
        }

        let mut scored: Vec<(&str, f32)> = self
            .records
            .iter()
            .filter_map(|record| {
                let embedding = record.embedding.as_ref()?;
                let score = self.metric.score(embedding, vector);
                let score = if score.is_nan() { f32::NEG_INFINITY } else { score };
                Some((record.title.as_str(), score))
            })
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(query.limit);
        Ok(scored
            .into_iter()
            .map(|(title, _)| title.to_string())
            .collect())
    }

    fn metric(&self) -> SimilarityMetric {
        self.metric
    }
}
