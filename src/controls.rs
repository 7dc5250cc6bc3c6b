//! Command-line and environment configuration shared by the binaries.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;

use crate::content::{ContentFetcher, FetcherConfig, DEFAULT_BASE_URL};
use crate::embeddings::SimilarityMetric;
use crate::error::{FetcherError, StoreError};
use crate::pipeline::{SearchPipeline, MAX_RESULTS};
use crate::resolver::SimilarityResolver;
use crate::store::{EmbeddingStore, PgVectorStore, StoreConfig, DEFAULT_NUM_CANDIDATES};
use crate::vector_store::{TableName, DEFAULT_INDEX, DEFAULT_SCHEMA, DEFAULT_TABLE};

/// Embedding store connection and search knobs.
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Postgres connection string (postgres://...)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Schema holding the embeddings table
    #[arg(long, env = "WIKISIM_SCHEMA", default_value = DEFAULT_SCHEMA)]
    pub schema: String,

    /// Table with `title` and `embedding` columns
    #[arg(long, env = "WIKISIM_TABLE", default_value = DEFAULT_TABLE)]
    pub table: String,

    /// Name of the HNSW index over `embedding`
    #[arg(long, env = "WIKISIM_INDEX", default_value = DEFAULT_INDEX)]
    pub index: String,

    /// Similarity metric; must match the index operator class
    #[arg(long, env = "WIKISIM_METRIC", value_enum, default_value_t = SimilarityMetric::Cosine)]
    pub metric: SimilarityMetric,

    /// Candidate pool explored by the approximate index
    #[arg(long, env = "WIKISIM_NUM_CANDIDATES", default_value_t = DEFAULT_NUM_CANDIDATES)]
    pub num_candidates: usize,

    /// Scan every row instead of using the approximate index
    #[arg(long, env = "WIKISIM_EXACT", default_value_t = false)]
    pub exact: bool,

    /// Seconds before connecting or querying the store times out
    #[arg(long, env = "WIKISIM_STORE_TIMEOUT_SECS", default_value_t = 10)]
    pub store_timeout_secs: u64,
}

impl StoreArgs {
    /// Converts the parsed flags into a [`StoreConfig`].
    pub fn build_config(&self) -> Result<StoreConfig, StoreError> {
        if self.index.trim().is_empty() {
            return Err(StoreError::InvalidIdentifier(
                "index name is required".to_string(),
            ));
        }
        Ok(StoreConfig {
            table: TableName::new(self.schema.clone(), self.table.clone())?,
            index_name: self.index.clone(),
            metric: self.metric,
            timeout: Duration::from_secs(self.store_timeout_secs.max(1)),
        })
    }

    /// Candidate pool, never smaller than the largest request (`MAX_RESULTS + 1`).
    pub fn effective_num_candidates(&self) -> usize {
        self.num_candidates.max(MAX_RESULTS + 1)
    }
}

/// Reference-site fetch settings.
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Reference site articles are fetched from
    #[arg(long, env = "WIKISIM_REFERENCE_BASE", default_value = DEFAULT_BASE_URL)]
    pub reference_base_url: String,

    /// Seconds before a reference page request times out
    #[arg(long, env = "WIKISIM_FETCH_TIMEOUT_SECS", default_value_t = 10)]
    pub fetch_timeout_secs: u64,

    /// Override the User-Agent sent to the reference site
    #[arg(long, env = "WIKISIM_USER_AGENT")]
    pub user_agent: Option<String>,
}

impl FetchArgs {
    /// Converts the parsed flags into a [`FetcherConfig`].
    pub fn build_config(&self) -> FetcherConfig {
        let defaults = FetcherConfig::default();
        FetcherConfig {
            base_url: self.reference_base_url.clone(),
            timeout: Duration::from_secs(self.fetch_timeout_secs.max(1)),
            user_agent: self
                .user_agent
                .clone()
                .filter(|agent| !agent.trim().is_empty())
                .unwrap_or(defaults.user_agent),
        }
    }

    /// Builds the fetcher.
    pub fn build_fetcher(&self) -> Result<ContentFetcher, FetcherError> {
        ContentFetcher::new(self.build_config())
    }
}

/// Connects to the store and assembles the search pipeline.
pub async fn connect_pipeline(
    store: &StoreArgs,
    fetch: &FetchArgs,
) -> anyhow::Result<SearchPipeline<PgVectorStore>> {
    use anyhow::Context;

    let fetcher = fetch
        .build_fetcher()
        .context("failed to configure reference-site fetcher")?;
    let config = store
        .build_config()
        .context("invalid embedding store configuration")?;
    let pg_store = PgVectorStore::connect(&store.database_url, config)
        .await
        .context("failed to open embedding store")?;
    tracing::info!(
        metric = ?pg_store.metric(),
        num_candidates = store.effective_num_candidates(),
        exact = store.exact,
        "embedding store ready"
    );
    let resolver = SimilarityResolver::new(Arc::new(pg_store))
        .with_num_candidates(store.effective_num_candidates())
        .with_exact(store.exact);
    Ok(SearchPipeline::new(resolver, fetcher))
}
