// =============================================================================
// REST API Endpoints: Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`:
//
//   GET  /api/v1/health
//   GET  /api/v1/tickers/:ticker               single-ticker detail + chart data
//   POST /api/v1/portfolio/extract?filename=   raw document body -> candidates
//   POST /api/v1/portfolio/analyze[?format=csv]
//
// CORS is permissive; the dashboard may be served from another origin.
// =============================================================================

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Json, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info, warn};

use crate::analysis::{ticker_detail, BatchRunner};
use crate::app_state::AppState;
use crate::documents::extract_from_document;
use crate::export::records_to_csv;
use crate::symbols::{format_ticker_list, parse_ticker_list};

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/tickers/:ticker", get(ticker))
        .route("/api/v1/portfolio/extract", post(extract))
        .route("/api/v1/portfolio/analyze", post(analyze))
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(cors)
        .with_state(state)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = serde_json::json!({ "error": message.into() });
    (status, Json(body)).into_response()
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.uptime_secs(),
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Single ticker
// =============================================================================

async fn ticker(State(state): State<Arc<AppState>>, Path(raw): Path<String>) -> Response {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Enter a stock ticker symbol");
    }

    let result = ticker_detail(
        state.fetcher.as_ref(),
        &ticker,
        state.config.lookback_days,
        state.config.indicator_params(),
    )
    .await;

    match result {
        Ok(Some(detail)) => Json(detail).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            format!("Could not find data for ticker '{ticker}'. Please check the symbol and try again."),
        ),
        Err(e) => {
            error!(ticker = %ticker, error = %format!("{e:#}"), "quote fetch failed");
            error_response(StatusCode::BAD_GATEWAY, format!("Quote provider error for '{ticker}'"))
        }
    }
}

// =============================================================================
// Portfolio: document extraction
// =============================================================================

#[derive(Deserialize)]
struct ExtractQuery {
    filename: String,
}

#[derive(Serialize)]
struct ExtractResponse {
    tickers: Vec<String>,
    /// Candidates joined for the user to edit.
    editable: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

async fn extract(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExtractQuery>,
    body: Bytes,
) -> impl IntoResponse {
    let extraction = extract_from_document(state.decoder.as_ref(), &query.filename, &body);
    debug!(filename = %query.filename, count = extraction.tickers.len(), "extract request");

    Json(ExtractResponse {
        editable: format_ticker_list(&extraction.tickers),
        tickers: extraction.tickers,
        warning: extraction.warning,
    })
}

// =============================================================================
// Portfolio: batch analysis
// =============================================================================

/// Either the edited free text or an explicit list.
#[derive(Deserialize)]
#[serde(untagged)]
enum TickerInput {
    Text(String),
    List(Vec<String>),
}

impl TickerInput {
    fn into_tickers(self) -> Vec<String> {
        match self {
            Self::Text(text) => parse_ticker_list(&text),
            Self::List(list) => list
                .iter()
                .map(|t| t.trim().to_uppercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct AnalyzeRequest {
    tickers: TickerInput,
}

#[derive(Deserialize)]
struct AnalyzeQuery {
    #[serde(default)]
    format: Option<String>,
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnalyzeQuery>,
    Json(request): Json<AnalyzeRequest>,
) -> Response {
    let tickers = request.tickers.into_tickers();
    if tickers.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Please enter at least one ticker symbol.");
    }

    info!(count = tickers.len(), "portfolio analysis requested");
    let report = BatchRunner::new(
        state.fetcher.as_ref(),
        state.config.lookback_days,
        state.config.indicator_params(),
    )
    .run(&tickers, |p| debug!(ticker = p.ticker, index = p.index, total = p.total, "fetching"))
    .await;

    if !report.failed.is_empty() {
        warn!(failed = ?report.failed, "could not fetch data for some tickers");
    }

    let wants_csv = query
        .format
        .as_deref()
        .is_some_and(|f| f.eq_ignore_ascii_case("csv"));
    if !wants_csv {
        return Json(report).into_response();
    }

    match records_to_csv(&report.succeeded, state.config.indicator_params()) {
        Ok(csv) => (
            [
                (header::CONTENT_TYPE, "text/csv"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"portfolio_analysis.csv\""),
            ],
            csv,
        )
            .into_response(),
        Err(e) => {
            error!(error = %format!("{e:#}"), "CSV export failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "CSV export failed")
        }
    }
}
