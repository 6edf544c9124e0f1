use axum::routing::{get, post};
use axum::Router;

use crate::commands::stats;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/statistics/waste-processing", get(stats::waste_processing))
        .route("/api/statistics/environmental", get(stats::environmental))
        .route("/api/statistics/larval-growth", get(stats::larval_growth))
        .route("/api/statistics/system-efficiency", get(stats::system_efficiency))
        .route("/api/statistics/daily-report", get(stats::daily_report))
        .route("/api/statistics/harvest-efficiency", get(stats::harvest_efficiency))
        .route("/api/send-harvest-report", post(stats::send_harvest_report))
}
