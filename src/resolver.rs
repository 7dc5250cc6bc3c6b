//! Embedding lookup and nearest-neighbor resolution with self-exclusion.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::StoreError;
use crate::store::{EmbeddingStore, NeighborQuery, DEFAULT_NUM_CANDIDATES};

/// Resolves similar articles through an [`EmbeddingStore`].
pub struct SimilarityResolver<S: ?Sized> {
    store: Arc<S>,
    num_candidates: usize,
    exact: bool,
}

impl<S: EmbeddingStore + ?Sized> SimilarityResolver<S> {
    /// Approximate resolver with the default candidate pool.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            num_candidates: DEFAULT_NUM_CANDIDATES,
            exact: false,
        }
    }

    /// Overrides the candidate pool handed to the approximate index.
    pub fn with_num_candidates(mut self, num_candidates: usize) -> Self {
        self.num_candidates = num_candidates.max(1);
        self
    }

    /// Switches between exact and approximate search.
    pub fn with_exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    /// Shared store handle.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Stored embedding for `title`, `None` when missing or unembedded.
    pub async fn lookup_embedding(&self, title: &str) -> Result<Option<Vec<f32>>, StoreError> {
        let embedding = self.store.embedding_for(title).await?;
        if embedding.is_none() {
            info!(title, "no embedding stored for title");
        }
        Ok(embedding)
    }

    /// Up to `k` titles most similar to `query`, dropping the first hit as the self-match.
    ///
    /// An absent query yields an empty list rather than an error.
    pub async fn find_similar(
        &self,
        query: Option<&[f32]>,
        k: usize,
    ) -> Result<Vec<String>, StoreError> {
        let Some(vector) = query else {
            return Ok(Vec::new());
        };
        if k == 0 {
            return Ok(Vec::new());
        }
        let mut candidates = self.candidates(vector, k).await?;
        if !candidates.is_empty() {
            candidates.remove(0);
        }
        candidates.truncate(k);
        Ok(candidates)
    }

    /// Up to `k` titles most similar to the stored article `title`, never including it.
    ///
    /// Every candidate carrying `title` is removed; when the article itself is not
    /// among the `k + 1` candidates the first `k` are kept.
    pub async fn similar_to(&self, title: &str, k: usize) -> Result<Vec<String>, StoreError> {
        let Some(vector) = self.lookup_embedding(title).await? else {
            return Ok(Vec::new());
        };
        if k == 0 {
            return Ok(Vec::new());
        }
        let mut candidates = self.candidates(&vector, k).await?;
        let before = candidates.len();
        candidates.retain(|candidate| candidate != title);
        if candidates.len() == before {
            debug!(title, "query article absent from its own candidates");
        }
        candidates.truncate(k);
        Ok(candidates)
    }

    async fn candidates(&self, vector: &[f32], k: usize) -> Result<Vec<String>, StoreError> {
        let query = NeighborQuery {
            limit: k.saturating_add(1),
            num_candidates: self.num_candidates,
            exact: self.exact,
        };
        let candidates = self.store.nearest(vector, query).await?;
        debug!(
            requested = query.limit,
            returned = candidates.len(),
            "nearest-neighbor candidates"
        );
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::ArticleRecord;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    fn resolver(records: Vec<ArticleRecord>) -> SimilarityResolver<MemoryStore> {
        SimilarityResolver::new(Arc::new(MemoryStore::new(records)))
    }

    fn abc() -> Vec<ArticleRecord> {
        vec![
            ArticleRecord::new("A", vec![1.0, 0.0, 0.0]),
            ArticleRecord::new("B", vec![0.0, 1.0, 0.0]),
            ArticleRecord::new("C", vec![0.9, 0.1, 0.0]),
        ]
    }

    #[tokio::test(flavor = "current_thread")]
    async fn nearest_non_self_neighbor_wins() {
        let resolver = resolver(abc());
        let embedding = resolver.lookup_embedding("A").await.expect("lookup");
        let similar = resolver
            .find_similar(embedding.as_deref(), 1)
            .await
            .expect("search");
        assert_eq!(similar, vec!["C"]);
        assert_eq!(resolver.similar_to("A", 1).await.expect("search"), vec!["C"]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn results_keep_descending_similarity() {
        let resolver = resolver(abc());
        assert_eq!(
            resolver.similar_to("A", 2).await.expect("search"),
            vec!["C", "B"]
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn missing_title_degrades_to_empty() {
        let resolver = resolver(abc());
        assert_eq!(resolver.lookup_embedding("Nope").await.expect("lookup"), None);
        assert!(resolver.find_similar(None, 3).await.expect("search").is_empty());
        assert!(resolver.similar_to("Nope", 3).await.expect("search").is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn unembedded_title_degrades_to_empty() {
        let mut records = abc();
        records.push(ArticleRecord::without_embedding("D"));
        let resolver = resolver(records);
        assert!(resolver.similar_to("D", 2).await.expect("search").is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn oversized_k_returns_every_other_article() {
        let resolver = resolver(abc());
        let similar = resolver.similar_to("B", 10).await.expect("search");
        assert_eq!(similar.len(), 2);
        assert!(!similar.contains(&"B".to_string()));

        let embedding = resolver.lookup_embedding("B").await.expect("lookup");
        let similar = resolver
            .find_similar(embedding.as_deref(), 10)
            .await
            .expect("search");
        assert_eq!(similar.len(), 2);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn single_article_store_yields_nothing() {
        let resolver = resolver(vec![ArticleRecord::new("Solo", vec![1.0, 2.0])]);
        assert!(resolver.similar_to("Solo", 5).await.expect("search").is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn identical_vectors_never_return_the_query_title() {
        // "Twin" ties with "Query" and sorts first by insertion order.
        let resolver = resolver(vec![
            ArticleRecord::new("Twin", vec![1.0, 0.0]),
            ArticleRecord::new("Query", vec![1.0, 0.0]),
            ArticleRecord::new("Other", vec![0.5, 0.5]),
        ]);
        assert_eq!(
            resolver.similar_to("Query", 2).await.expect("search"),
            vec!["Twin", "Other"]
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn length_never_exceeds_k() {
        let records: Vec<ArticleRecord> = (0..12)
            .map(|i| ArticleRecord::new(format!("T{i}"), vec![1.0, i as f32]))
            .collect();
        let resolver = resolver(records);
        for k in 1..=10 {
            let similar = resolver.similar_to("T3", k).await.expect("search");
            assert_eq!(similar.len(), k);
            assert!(!similar.contains(&"T3".to_string()));
        }
    }
}
