//! pgvector-backed embedding store.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use pgvector::Vector;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error, info, warn};

use super::{EmbeddingStore, NeighborQuery};
use crate::embeddings::SimilarityMetric;
use crate::error::StoreError;
use crate::vector_store::{TableName, DEFAULT_INDEX};

/// Upper bound pgvector accepts for `hnsw.ef_search`.
const MAX_EF_SEARCH: usize = 1000;
const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection-independent settings for [`PgVectorStore`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Table holding `title` and `embedding` columns.
    pub table: TableName,
    /// Name of the HNSW index over `embedding`.
    pub index_name: String,
    /// Ranking metric; must match the index operator class.
    pub metric: SimilarityMetric,
    /// Bound on connecting and on every query.
    pub timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table: TableName::default(),
            index_name: DEFAULT_INDEX.to_string(),
            metric: SimilarityMetric::Cosine,
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}

/// Embedding store over a Postgres table with a pgvector `embedding` column.
///
/// The client sits behind a mutex so each nearest-neighbor query can scope its
/// search settings to its own transaction.
pub struct PgVectorStore {
    client: Mutex<Client>,
    config: StoreConfig,
    titles_sql: String,
    embedding_sql: String,
    nearest_sql: String,
}

impl PgVectorStore {
    /// Connects to `database_url`, then checks that the configured index exists.
    pub async fn connect(database_url: &str, config: StoreConfig) -> Result<Self, StoreError> {
        let mut pg_config: tokio_postgres::Config =
            database_url.parse().map_err(StoreError::Connect)?;
        pg_config.connect_timeout(config.timeout);
        let (client, connection) = timeout(config.timeout, pg_config.connect(NoTls))
            .await
            .map_err(|_| StoreError::Timeout(config.timeout))?
            .map_err(StoreError::Connect)?;
        tokio::spawn(async move {
            if let Err(err) = connection.await {
                error!(error = %err, "postgres connection error");
            }
        });
        info!(table = %config.table.qualified(), metric = ?config.metric, "connected to embedding store");

        let store = Self::from_client(client, config);
        store.verify_index().await?;
        Ok(store)
    }

    /// Wraps an already-established client.
    pub fn from_client(client: Client, config: StoreConfig) -> Self {
        Self {
            client: Mutex::new(client),
            titles_sql: titles_sql(&config.table),
            embedding_sql: embedding_sql(&config.table),
            nearest_sql: nearest_sql(&config.table, config.metric),
            config,
        }
    }

    /// Logs a warning when the vector index is missing or built for another metric.
    pub async fn verify_index(&self) -> Result<(), StoreError> {
        let table = &self.config.table;
        let index = self.config.index_name.as_str();
        let row = self
            .bounded(async {
                let client = self.client.lock().await;
                client
                    .query_opt(
                        "SELECT indexdef FROM pg_indexes \
                         WHERE schemaname = $1 AND tablename = $2 AND indexname = $3",
                        &[&table.schema(), &table.table(), &index],
                    )
                    .await
            })
            .await?;
        let opclass = self.config.metric.pg_opclass();
        match row {
            None => warn!(
                index,
                "vector index missing; searches fall back to a sequential scan \
                 (CREATE INDEX {index} ON {} USING hnsw (embedding {opclass}))",
                table.qualified()
            ),
            Some(row) => {
                let definition: String = row.try_get(0)?;
                if !definition.contains(opclass) {
                    warn!(index, definition = %definition, "vector index operator class does not match {opclass}");
                }
            }
        }
        Ok(())
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, tokio_postgres::Error>>,
    {
        timeout(self.config.timeout, fut)
            .await
            .map_err(|_| StoreError::Timeout(self.config.timeout))?
            .map_err(StoreError::Query)
    }
}

#[async_trait]
impl EmbeddingStore for PgVectorStore {
    async fn titles(&self) -> Result<Vec<String>, StoreError> {
        let rows = self
            .bounded(async {
                let client = self.client.lock().await;
                client.query(self.titles_sql.as_str(), &[]).await
            })
            .await?;
        let mut titles = Vec::with_capacity(rows.len());
        for row in rows {
            titles.push(row.try_get::<_, String>("title")?);
        }
        Ok(titles)
    }

    async fn embedding_for(&self, title: &str) -> Result<Option<Vec<f32>>, StoreError> {
        let row = self
            .bounded(async {
                let client = self.client.lock().await;
                client.query_opt(self.embedding_sql.as_str(), &[&title]).await
            })
            .await?;
        match row {
            Some(row) => {
                let vector: Vector = row.try_get("embedding")?;
                Ok(Some(vector.to_vec()))
            }
            None => Ok(None),
        }
    }

    async fn nearest(
        &self,
        vector: &[f32],
        query: NeighborQuery,
    ) -> Result<Vec<String>, StoreError> {
        if query.limit == 0 {
            return Ok(Vec::new());
        }
        let vector = Vector::from(vector.to_vec());
        let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);
        let settings = search_settings_sql(query);
        debug!(limit = query.limit, settings = %settings, "nearest-neighbor query");

        let rows = self
            .bounded(async {
                let mut client = self.client.lock().await;
                let transaction = client.transaction().await?;
                transaction.batch_execute(&settings).await?;
                let rows = transaction
                    .query(self.nearest_sql.as_str(), &[&vector, &limit])
                    .await?;
                transaction.commit().await?;
                Ok::<_, tokio_postgres::Error>(rows)
            })
            .await?;
        let mut titles = Vec::with_capacity(rows.len());
        for row in rows {
            titles.push(row.try_get::<_, String>("title")?);
        }
        Ok(titles)
    }

    fn metric(&self) -> SimilarityMetric {
        self.config.metric
    }
}

fn titles_sql(table: &TableName) -> String {
    format!(
        "SELECT DISTINCT title FROM {} ORDER BY title",
        table.qualified()
    )
}

fn embedding_sql(table: &TableName) -> String {
    format!(
        "SELECT embedding FROM {} \
        WHERE title = $1 AND embedding IS NOT NULL \
        LIMIT 1",
        table.qualified()
    )
}

fn nearest_sql(table: &TableName, metric: SimilarityMetric) -> String {
    format!(
        "SELECT title FROM {} \
        WHERE embedding IS NOT NULL \
        ORDER BY embedding {} $1 \
        LIMIT $2",
        table.qualified(),
        metric.pg_operator()
    )
}

fn search_settings_sql(query: NeighborQuery) -> String {
    if query.exact {
        "SET LOCAL enable_indexscan = off".to_string()
    } else {
        let ef_search = query
            .num_candidates
            .max(query.limit)
            .clamp(1, MAX_EF_SEARCH);
        format!("SET LOCAL hnsw.ef_search = {ef_search}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn nearest_sql_orders_by_metric_operator() {
        let sql = nearest_sql(&TableName::default(), SimilarityMetric::Cosine);
        assert_eq!(
            sql,
            "SELECT title FROM \"wiki\".\"embeddings\" WHERE embedding IS NOT NULL \
             ORDER BY embedding <=> $1 LIMIT $2"
        );
        let sql = nearest_sql(&TableName::default(), SimilarityMetric::Euclidean);
        assert!(sql.contains("embedding <-> $1"));
    }

    #[test]
    fn embedding_lookup_takes_first_embedded_row() {
        let sql = embedding_sql(&TableName::default());
        assert!(sql.contains("WHERE title = $1 AND embedding IS NOT NULL"));
        assert!(sql.ends_with("LIMIT 1"));
    }

    #[test]
    fn approximate_search_widens_candidate_pool() {
        let query = NeighborQuery {
            limit: 6,
            num_candidates: 50,
            exact: false,
        };
        assert_eq!(search_settings_sql(query), "SET LOCAL hnsw.ef_search = 50");

        let small_pool = NeighborQuery {
            num_candidates: 2,
            ..query
        };
        assert_eq!(search_settings_sql(small_pool), "SET LOCAL hnsw.ef_search = 6");
    }

    #[test]
    fn exact_search_disables_index_scans() {
        let query = NeighborQuery {
            limit: 3,
            num_candidates: 50,
            exact: true,
        };
        assert_eq!(search_settings_sql(query), "SET LOCAL enable_indexscan = off");
    }
}
