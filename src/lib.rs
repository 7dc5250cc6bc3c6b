#![warn(missing_docs)]
//! Core library entry points for wikisim: similar-article lookup over stored
//! embeddings plus live reference excerpts.

pub mod content;
pub mod controls;
pub mod embeddings;
pub mod error;
pub mod html;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod resolver;
pub mod store;
pub mod vector_store;

pub use content::{ContentExcerpt, ContentFetcher, ExcerptStatus, FetcherConfig, UNAVAILABLE_MARKER};
pub use controls::{connect_pipeline, FetchArgs, StoreArgs};
pub use embeddings::{ArticleRecord, SimilarityMetric};
pub use error::{FetcherError, SearchError, StoreError};
pub use pipeline::{SearchOutcome, SearchPipeline, SimilarArticle, DEFAULT_RESULTS, MAX_RESULTS};
pub use render::{render_outcome, render_titles};
pub use resolver::SimilarityResolver;
pub use store::{EmbeddingStore, MemoryStore, NeighborQuery, PgVectorStore, StoreConfig};
pub use vector_store::TableName;
