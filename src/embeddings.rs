//! Article embedding records and the similarity metrics used to rank them.

use serde::{Deserialize, Serialize};

/// Stored article row: a unique title plus its precomputed embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Article title, unique across the store.
    pub title: String,
    /// Embedding vector; `None` when ingestion skipped the article.
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

impl ArticleRecord {
    /// Builds a record that carries an embedding.
    pub fn new(title: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            title: title.into(),
            embedding: Some(embedding),
        }
    }

    /// Builds a record without an embedding.
    pub fn without_embedding(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            embedding: None,
        }
    }
}

/// Similarity metric the store ranks neighbors by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    /// Cosine similarity (pgvector `<=>`).
    #[default]
    Cosine,
    /// Inner product (pgvector `<#>`).
    DotProduct,
    /// L2 distance (pgvector `<->`).
    Euclidean,
}

impl SimilarityMetric {
    /// pgvector distance operator; smaller values rank first.
    pub fn pg_operator(self) -> &'static str {
        match self {
            Self::Cosine => "<=>",
            Self::DotProduct => "<#>",
            Self::Euclidean => "<->",
        }
    }

    /// Operator class used when building the HNSW index for this metric.
    pub fn pg_opclass(self) -> &'static str {
        match self {
            Self::Cosine => "vector_cosine_ops",
            Self::DotProduct => "vector_ip_ops",
            Self::Euclidean => "vector_l2_ops",
        }
    }

    /// Similarity score where larger means closer. Mismatched lengths score lowest.
    pub fn score(self, a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return f32::NEG_INFINITY;
        }
        match self {
            Self::Cosine => cosine_similarity(a, b),
            Self::DotProduct => dot(a, b) as f32,
            Self::Euclidean => -euclidean_distance(a, b),
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum()
}

/// Cosine similarity of two equal-length vectors; zero-norm inputs score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let norm_a = dot(a, a).sqrt();
    let norm_b = dot(b, b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot(a, b) / (norm_a * norm_b)) as f32
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = f64::from(*x) - f64::from(*y);
            d * d
        })
        .sum::<f64>()
        .sqrt() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_prefers_aligned_vectors() {
        let a = [1.0, 0.0, 0.0];
        let close = [0.9, 0.1, 0.0];
        let far = [0.0, 1.0, 0.0];
        let metric = SimilarityMetric::Cosine;
        assert!(metric.score(&a, &close) > metric.score(&a, &far));
        assert!((metric.score(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn euclidean_scores_nearer_points_higher() {
        let metric = SimilarityMetric::Euclidean;
        assert!(metric.score(&[0.0, 0.0], &[0.5, 0.0]) > metric.score(&[0.0, 0.0], &[2.0, 0.0]));
    }

    #[test]
    fn mismatched_dimensions_rank_last() {
        let metric = SimilarityMetric::DotProduct;
        assert_eq!(metric.score(&[1.0, 2.0], &[1.0]), f32::NEG_INFINITY);
    }

    #[test]
    fn zero_vector_has_zero_cosine() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
