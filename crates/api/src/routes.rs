use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use stockradar_core::{DataError, Lookback, ScreenError};
use stockradar_screener::{diagnose, enrich, find_pool, scan, ScanConfig};

pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/diagnose/{symbol}", get(diagnose_symbol))
        .route("/scan", post(run_scan))
        .route("/pools", get(list_pools))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ---------------------------------------------------------------------------
// Single-instrument diagnostics
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct DiagnoseParams {
    lookback: Option<String>,
}

async fn diagnose_symbol(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(params): Query<DiagnoseParams>,
) -> impl IntoResponse {
    // Six months by default so the 60-day MA window is populated.
    let lookback = match params.lookback.as_deref() {
        None => Lookback::SixMonths,
        Some(raw) => match Lookback::parse(raw) {
            Some(lookback) => lookback,
            None => return error_response(StatusCode::BAD_REQUEST, format!("Unknown lookback '{raw}'")),
        },
    };

    let bars = match state.provider.price_history(&symbol, lookback).await {
        Ok(bars) => bars,
        Err(err) => return data_error_response(&symbol, err),
    };

    let series = match enrich(&bars) {
        Ok(series) => series,
        Err(err) => return screen_error_response(err),
    };

    let name = state.provider.display_name(&symbol).await;
    let fundamentals = state.provider.fundamentals(&symbol).await.ok();

    match diagnose(&symbol, &name, &series, fundamentals) {
        Ok(report) => (StatusCode::OK, Json(serde_json::to_value(&report).unwrap_or_default())),
        Err(err) => screen_error_response(err),
    }
}

// ---------------------------------------------------------------------------
// Radar scan
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ScanRequest {
    /// Explicit symbol list; takes precedence over `pool`.
    symbols: Option<Vec<String>>,
    /// Name of a configured candidate pool.
    pool: Option<String>,
    min_score: Option<u8>,
    lookback: Option<String>,
}

async fn run_scan(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScanRequest>,
) -> impl IntoResponse {
    let symbols = match (&req.symbols, &req.pool) {
        (Some(symbols), _) if !symbols.is_empty() => symbols.clone(),
        (_, Some(pool_name)) => match find_pool(&state.pools, pool_name) {
            Some(pool) => pool.symbols.clone(),
            None => {
                return error_response(
                    StatusCode::NOT_FOUND,
                    format!("Unknown pool '{pool_name}'"),
                )
            }
        },
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Provide either 'symbols' or 'pool'".to_string(),
            )
        }
    };

    let min_score = req.min_score.unwrap_or(3).clamp(1, 7);
    let lookback = match req.lookback.as_deref() {
        None => Lookback::ThreeMonths,
        Some(raw) => match Lookback::parse(raw) {
            Some(lookback) => lookback,
            None => return error_response(StatusCode::BAD_REQUEST, format!("Unknown lookback '{raw}'")),
        },
    };

    let config = ScanConfig {
        min_score,
        lookback,
        ..Default::default()
    };
    let report = scan(state.provider.as_ref(), &symbols, &config).await;
    (
        StatusCode::OK,
        Json(serde_json::to_value(&report).unwrap_or_default()),
    )
}

// ---------------------------------------------------------------------------
// Pools
// ---------------------------------------------------------------------------

async fn list_pools(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.pools.clone())
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

fn error_response(status: StatusCode, message: String) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(serde_json::json!({ "error": message })))
}

fn data_error_response(symbol: &str, err: DataError) -> (StatusCode, Json<serde_json::Value>) {
    let status = if err.is_no_data() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::BAD_GATEWAY
    };
    tracing::warn!(%symbol, %err, "Data fetch failed");
    error_response(status, err.to_string())
}

fn screen_error_response(err: ScreenError) -> (StatusCode, Json<serde_json::Value>) {
    error_response(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
}
