//! Error types surfaced by the store, the content fetcher and the search pipeline.

use std::time::Duration;

use thiserror::Error;

/// Failures talking to the embedding store. These are never recovered locally.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The initial connection could not be established.
    #[error("failed to connect to embedding store: {0}")]
    Connect(#[source] tokio_postgres::Error),
    /// A query against an established connection failed.
    #[error("embedding store query failed: {0}")]
    Query(#[from] tokio_postgres::Error),
    /// The store did not answer within the configured bound.
    #[error("embedding store did not answer within {0:?}")]
    Timeout(Duration),
    /// A schema, table or index identifier was rejected.
    #[error("invalid store identifier: {0}")]
    InvalidIdentifier(String),
    /// A query vector does not match the store-wide dimensionality.
    #[error("query vector has {got} dimensions, store holds {expected}")]
    DimensionMismatch {
        /// Dimensionality of the stored vectors.
        expected: usize,
        /// Dimensionality of the offending query vector.
        got: usize,
    },
}

/// Failures constructing the reference-site client.
#[derive(Debug, Error)]
pub enum FetcherError {
    /// The configured base URL is not an absolute http(s) URL.
    #[error("reference base URL {0:?} must be an absolute http(s) URL")]
    InvalidBaseUrl(String),
    /// The HTTP client could not be built.
    #[error("failed to build reference-site HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Failures of a full search action.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The store was unreachable or a query failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The requested result count is outside `1..=max`.
    #[error("result count {requested} is outside 1..={max}")]
    InvalidCount {
        /// Count supplied by the caller.
        requested: usize,
        /// Largest count accepted.
        max: usize,
    },
}
