//! The embedding store seam and its implementations.

use async_trait::async_trait;

use crate::embeddings::SimilarityMetric;
use crate::error::StoreError;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::{PgVectorStore, StoreConfig};

/// Default over-fetch handed to the approximate index.
pub const DEFAULT_NUM_CANDIDATES: usize = 50;

/// Parameters of a single nearest-neighbor request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborQuery {
    /// Maximum number of titles returned.
    pub limit: usize,
    /// Candidate pool the approximate search explores before ranking.
    pub num_candidates: usize,
    /// Disables the approximate index when true.
    pub exact: bool,
}

impl NeighborQuery {
    /// Approximate query with the default candidate pool.
    pub fn approximate(limit: usize) -> Self {
        Self {
            limit,
            num_candidates: DEFAULT_NUM_CANDIDATES.max(limit),
            exact: false,
        }
    }
}

/// Read-only document store of `{title, embedding}` pairs with a nearest-neighbor primitive.
#[async_trait]
pub trait EmbeddingStore: Send + Sync {
    /// All distinct titles, sorted.
    async fn titles(&self) -> Result<Vec<String>, StoreError>;

    /// Embedding of the first record titled `title`; `None` when absent or unembedded.
    async fn embedding_for(&self, title: &str) -> Result<Option<Vec<f32>>, StoreError>;

    /// Titles ranked by descending similarity to `vector`, at most `query.limit` long.
    async fn nearest(
        &self,
        vector: &[f32],
        query: NeighborQuery,
    ) -> Result<Vec<String>, StoreError>;

    /// Metric `nearest` ranks by.
    fn metric(&self) -> SimilarityMetric;
}
