use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::config::AppConfig;
use crate::cycle_manager::{CycleReport, ScanService};
use crate::models::ScanRequest;

pub struct AppState {
    pub config: Arc<AppConfig>,
    pub service: Arc<ScanService>,
}

pub type SharedAppState = Arc<AppState>;

pub fn router(state: SharedAppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(ui_handler))
        .route("/scan", post(scan_handler))
        .route("/results", get(results_handler))
        .layer(cors)
        .with_state(state)
}

fn report_body(report: &CycleReport, superseded: bool) -> serde_json::Value {
    let results = report.visible();
    json!({
        "status": "success",
        "cycleId": report.cycle_id,
        "fetchedAt": report.fetched_at,
        "completedAt": report.completed_at,
        "superseded": superseded,
        "params": report.params,
        "count": results.len(),
        "results": results,
        "health": report.health,
    })
}

/// GET /
pub async fn ui_handler(State(state): State<SharedAppState>) -> impl IntoResponse {
    let exchanges: Vec<&str> = state.config.exchanges.iter().map(|e| e.name.as_str()).collect();
    (
        StatusCode::OK,
        Json(json!({
            "message": "Direct cross-exchange arbitrage scanner running",
            "usage": "POST /scan with { investment, min_profit, exchanges }",
            "exchanges": exchanges,
        })),
    )
}

/// POST /scan
/// Body: { investment: 1000, min_profit: 0.5, exchanges: ["Binance","OKX"] }
pub async fn scan_handler(
    State(state): State<SharedAppState>,
    Json(payload): Json<ScanRequest>,
) -> impl IntoResponse {
    // bad input rejects the cycle before any fetch; the last report stays as is
    let params = match state.config.scan_params(&payload) {
        Ok(p) => p,
        Err(e) => {
            warn!("scan rejected: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"status": "error", "message": e.to_string()})),
            );
        }
    };

    let outcome = state.service.run_cycle(params).await;
    (
        StatusCode::OK,
        Json(report_body(outcome.report(), outcome.is_superseded())),
    )
}

/// GET /results: the newest completed cycle, through its own view filter.
pub async fn results_handler(State(state): State<SharedAppState>) -> impl IntoResponse {
    match state.service.latest().await {
        Some(report) => (StatusCode::OK, Json(report_body(&report, false))),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"status": "empty", "message": "no completed scan yet"})),
        ),
    }
}
