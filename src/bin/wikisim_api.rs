use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use wikisim::pipeline::{DEFAULT_RESULTS, MAX_RESULTS};
use wikisim::{
    connect_pipeline, logging, FetchArgs, PgVectorStore, SearchError, SearchOutcome,
    SearchPipeline, StoreArgs,
};

#[derive(Parser, Debug)]
#[command(
    name = "wikisim-api",
    about = "HTTP API serving similar-article recommendations with live excerpts"
)]
struct ApiCli {
    /// Address to bind the HTTP server to (host:port).
    #[arg(long, env = "WIKISIM_BIND", default_value = "127.0.0.1:8080")]
    bind: String,

    #[command(flatten)]
    store: StoreArgs,

    #[command(flatten)]
    fetch: FetchArgs,
}

#[derive(Clone)]
struct AppState {
    pipeline: Arc<SearchPipeline<PgVectorStore>>,
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    title: String,
    #[serde(default)]
    count: Option<usize>,
}

#[derive(Debug, Serialize)]
struct TitlesResponse {
    titles: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init("info");
    let cli = ApiCli::parse();
    let pipeline = connect_pipeline(&cli.store, &cli.fetch).await?;
    let state = AppState {
        pipeline: Arc::new(pipeline),
    };
    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/titles", get(titles_handler))
        .route("/v1/search", post(search_handler))
        .with_state(state);

    let addr: SocketAddr = cli
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", cli.bind))?;
    info!("wikisim-api listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .await
        .context("server shutdown")?;
    Ok(())
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn titles_handler(
    State(state): State<AppState>,
) -> Result<Json<TitlesResponse>, (StatusCode, Json<ErrorBody>)> {
    let titles = state.pipeline.titles().await.map_err(search_error)?;
    Ok(Json(TitlesResponse { titles }))
}

async fn search_handler(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchOutcome>, (StatusCode, Json<ErrorBody>)> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(bad_request("title must not be empty"));
    }
    let count = request
        .count
        .unwrap_or(DEFAULT_RESULTS)
        .clamp(1, MAX_RESULTS);
    let outcome = state
        .pipeline
        .run_search(title, count)
        .await
        .map_err(search_error)?;
    Ok(Json(outcome))
}

fn bad_request(message: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            message: message.into(),
        }),
    )
}

fn search_error(err: SearchError) -> (StatusCode, Json<ErrorBody>) {
    let status = match &err {
        SearchError::InvalidCount { .. } => StatusCode::BAD_REQUEST,
        SearchError::Store(_) => {
            error!(error = %err, "embedding store failure");
            StatusCode::SERVICE_UNAVAILABLE
        }
    };
    (
        status,
        Json(ErrorBody {
            message: err.to_string(),
        }),
    )
}
