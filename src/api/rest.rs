// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`:
//   GET /api/v1/health            — liveness + request counters
//   GET /api/v1/config            — effective runtime config
//   GET /api/v1/analysis/:symbol  — JSON snapshot envelope
//   GET /api/v1/report/:symbol    — plain-text snapshot report
//
// Symbols are validated before any upstream call.  A price-history outage is
// a 502; an input the analyzer rejects is still a 200 whose `result` holds
// the `{ "error": ... }` object.
//
// CORS is configured permissively; the service is read-only.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::AnalysisReport;
use crate::app_state::{AppState, ServiceStats};
use crate::report::SnapshotReport;

/// Longest accepted ticker, suffix included.
const MAX_SYMBOL_LEN: usize = 20;

type ApiError = (StatusCode, Json<serde_json::Value>);

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/config", get(config))
        .route("/api/v1/analysis/:symbol", get(analysis))
        .route("/api/v1/report/:symbol", get(report))
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state)
}

// =============================================================================
// Symbol validation
// =============================================================================

/// Uppercased ticker if `raw` is 1–20 characters of `A-Z 0-9 . - & _`.
pub fn normalize_symbol(raw: &str) -> Option<String> {
    let symbol = raw.trim().to_uppercase();
    let valid_len = (1..=MAX_SYMBOL_LEN).contains(&symbol.len());
    let valid_chars = symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '&' | '_'));
    (valid_len && valid_chars).then_some(symbol)
}

fn error_body(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(serde_json::json!({ "error": message.into() })))
}

/// Validate `raw`, run the snapshot service and account for the outcome.
async fn run_snapshot(state: &AppState, raw: &str) -> Result<(String, AnalysisReport), ApiError> {
    let Some(symbol) = normalize_symbol(raw) else {
        state.record_failed();
        warn!(symbol = %raw, "rejected invalid symbol");
        return Err(error_body(
            StatusCode::BAD_REQUEST,
            format!("Invalid symbol: '{raw}'"),
        ));
    };

    match state.snapshots.build(&symbol).await {
        Ok(report) => {
            state.record_served();
            Ok((symbol, report))
        }
        Err(e) => {
            state.record_failed();
            warn!(symbol = %symbol, error = %e, "snapshot failed upstream");
            Err(error_body(StatusCode::BAD_GATEWAY, format!("{e:#}")))
        }
    }
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    #[serde(flatten)]
    stats: ServiceStats,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        stats: state.stats(),
        server_time: Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Config
// =============================================================================

async fn config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let config = state.runtime_config.read().clone();
    Json(config)
}

// =============================================================================
// Analysis
// =============================================================================

#[derive(Serialize)]
struct AnalysisEnvelope {
    request_id: String,
    symbol: String,
    generated_at: DateTime<Utc>,
    result: AnalysisReport,
}

async fn analysis(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<AnalysisEnvelope>, ApiError> {
    let (symbol, report) = run_snapshot(&state, &symbol).await?;
    let envelope = AnalysisEnvelope {
        request_id: Uuid::new_v4().to_string(),
        symbol,
        generated_at: Utc::now(),
        result: report,
    };
    info!(request_id = %envelope.request_id, symbol = %envelope.symbol, "analysis served");
    Ok(Json(envelope))
}

// =============================================================================
// Text report
// =============================================================================

async fn report(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<String, ApiError> {
    let (symbol, report) = run_snapshot(&state, &symbol).await?;
    let today = Utc::now().date_naive();
    Ok(SnapshotReport::new(&symbol, &report, today).to_string())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime_config::RuntimeConfig;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn offline_state() -> Arc<AppState> {
        let config = RuntimeConfig {
            yahoo_base_url: "http://127.0.0.1:9".to_string(),
            nse_base_url: "http://127.0.0.1:9".to_string(),
            enable_option_chain: false,
            enable_corporate_calendar: false,
            http_timeout_secs: 2,
            ..RuntimeConfig::default()
        };
        Arc::new(AppState::new(config).unwrap())
    }

    async fn fetch(state: Arc<AppState>, uri: &str) -> (StatusCode, serde_json::Value) {
        let resp = router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    // ---- symbol validation -------------------------------------------------

    #[test]
    fn symbols_are_normalized() {
        assert_eq!(normalize_symbol(" tcs "), Some("TCS".to_string()));
        assert_eq!(normalize_symbol("M&M"), Some("M&M".to_string()));
        assert_eq!(normalize_symbol("bajaj-auto.ns"), Some("BAJAJ-AUTO.NS".to_string()));
    }

    #[test]
    fn bad_symbols_are_rejected() {
        assert_eq!(normalize_symbol(""), None);
        assert_eq!(normalize_symbol("TCS;DROP"), None);
        assert_eq!(normalize_symbol("A".repeat(21).as_str()), None);
        assert_eq!(normalize_symbol("^NSEI"), None);
    }

    // ---- routes ------------------------------------------------------------

    #[tokio::test]
    async fn health_reports_counters() {
        let (status, body) = fetch(offline_state(), "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["requests_served"], 0);
        assert!(body["uptime_secs"].is_u64());
    }

    #[tokio::test]
    async fn config_is_exposed() {
        let (status, body) = fetch(offline_state(), "/api/v1/config").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["exchange_suffix"], ".NS");
        assert_eq!(body["enable_option_chain"], false);
    }

    #[tokio::test]
    async fn invalid_symbol_is_bad_request() {
        let state = offline_state();
        let (status, body) = fetch(state.clone(), "/api/v1/analysis/TCS%3B").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid symbol"));
        assert_eq!(state.stats().requests_failed, 1);
    }

    #[tokio::test]
    async fn upstream_outage_is_bad_gateway() {
        let state = offline_state();
        let (status, body) = fetch(state.clone(), "/api/v1/analysis/tcs").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("failed to fetch price history for TCS"));
        assert_eq!(state.stats().requests_served, 0);
    }

    #[tokio::test]
    async fn report_route_shares_validation() {
        let (status, _) = fetch(offline_state(), "/api/v1/report/%5ENSEI").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let (status, _) = fetch(offline_state(), "/api/v1/state").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
