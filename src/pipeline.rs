//! The search action: similar-article lookup followed by the excerpt fetch.

use std::time::Instant;

use serde::Serialize;
use tracing::info;

use crate::content::{article_url, ContentExcerpt, ContentFetcher};
use crate::error::SearchError;
use crate::resolver::SimilarityResolver;
use crate::store::EmbeddingStore;

/// Largest result count a caller may request.
pub const MAX_RESULTS: usize = 10;
/// Result count used when the caller does not pick one.
pub const DEFAULT_RESULTS: usize = 5;

/// One ranked recommendation with its reference link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimilarArticle {
    /// 1-based position in the ranking.
    pub rank: usize,
    /// Article title.
    pub title: String,
    /// Reference page URL.
    pub url: String,
}

/// Everything a presentation layer renders for one search action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    /// Title the user selected.
    pub title: String,
    /// Excerpt of the selected article.
    pub excerpt: ContentExcerpt,
    /// Ranked similar articles, most similar first.
    pub results: Vec<SimilarArticle>,
}

/// Resolver plus fetcher wired together, independent of any UI.
pub struct SearchPipeline<S: ?Sized> {
    resolver: SimilarityResolver<S>,
    fetcher: ContentFetcher,
}

impl<S: EmbeddingStore + ?Sized> SearchPipeline<S> {
    /// Combines a resolver with a fetcher.
    pub fn new(resolver: SimilarityResolver<S>, fetcher: ContentFetcher) -> Self {
        Self { resolver, fetcher }
    }

    /// Underlying resolver.
    pub fn resolver(&self) -> &SimilarityResolver<S> {
        &self.resolver
    }

    /// Titles offered for selection.
    pub async fn titles(&self) -> Result<Vec<String>, SearchError> {
        Ok(self.resolver.store().titles().await?)
    }

    /// Runs one search: embedding lookup, neighbor search, then the excerpt fetch.
    ///
    /// Neighbors come from [`SimilarityResolver::similar_to`], which drops the
    /// selected title by name rather than dropping the first hit.
    ///
    /// Store failures propagate; a missing embedding or an unreachable page only
    /// degrade the outcome.
    pub async fn run_search(&self, title: &str, k: usize) -> Result<SearchOutcome, SearchError> {
        validate_count(k)?;
        let start = Instant::now();

        let similar = self.resolver.similar_to(title, k).await?;
        let excerpt = self.fetcher.fetch(title).await;

        let base_url = self.fetcher.base_url();
        let results = similar
            .into_iter()
            .enumerate()
            .map(|(idx, similar_title)| SimilarArticle {
                rank: idx + 1,
                url: article_url(base_url, &similar_title),
                title: similar_title,
            })
            .collect::<Vec<_>>();

        info!(
            title,
            k,
            results = results.len(),
            excerpt = ?excerpt.status,
            latency_ms = start.elapsed().as_secs_f64() * 1000.0,
            "search complete"
        );
        Ok(SearchOutcome {
            title: title.to_string(),
            excerpt,
            results,
        })
    }
}

/// Accepts result counts in `1..=MAX_RESULTS`.
pub fn validate_count(k: usize) -> Result<usize, SearchError> {
    if (1..=MAX_RESULTS).contains(&k) {
        Ok(k)
    } else {
        Err(SearchError::InvalidCount {
            requested: k,
            max: MAX_RESULTS,
        })
    }
}
