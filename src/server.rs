//! HTTP entry point.
//!
//! # Routes
//!
//! - `GET /?articles=<url>,<url>,...` - analyze up to `max_urls` articles
//!
//! | Request | Response |
//! |---------|----------|
//! | no (or empty) `articles` | `200 {}` |
//! | more than `max_urls` URLs | `400 {"error": "too many urls in request, should be 10 or less"}` |
//! | otherwise | `200 [{"status", "url", "score", "words_count"}, ...]` in completion order |
//!
//! Empty entries in the list are dropped before counting, so `?articles=,,`
//! is treated like a missing parameter instead of three failed fetches.

use crate::error::Result;
use crate::models::ArticleReport;
use crate::orchestrator::Analyzer;
use crate::worker::Timeouts;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared by every request: the analyzer (and with it one HTTP client
/// connection pool) is built once at startup.
#[derive(Debug, Clone)]
pub struct AppState {
    pub analyzer: Analyzer,
    pub timeouts: Timeouts,
    pub max_urls: usize,
}

#[derive(Debug, Deserialize)]
pub struct ArticlesQuery {
    pub articles: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(analyze_articles))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn analyze_articles(State(state): State<AppState>, Query(query): Query<ArticlesQuery>) -> Response {
    let urls = parse_articles_param(query.articles.as_deref().unwrap_or_default());
    if urls.is_empty() {
        return Json(serde_json::json!({})).into_response();
    }

    if urls.len() > state.max_urls {
        warn!(count = urls.len(), max = state.max_urls, "Rejected request with too many URLs");
        let body = ApiError {
            error: format!("too many urls in request, should be {} or less", state.max_urls),
        };
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    }

    let results = state.analyzer.process(&urls, state.timeouts).await;
    let reports: Vec<ArticleReport> = results.iter().map(ArticleReport::from).collect();
    Json(reports).into_response()
}

/// Split the comma-separated `articles` value, dropping empty entries.
fn parse_articles_param(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(String::from)
        .collect()
}

/// Bind `address` and serve until the process is stopped.
pub async fn start_server(state: AppState, address: SocketAddr) -> Result<()> {
    info!(%address, "Starting HTTP server");
    let app = create_router(state);
    let listener = TcpListener::bind(address).await?;
    info!(address = %listener.local_addr()?, "HTTP server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
