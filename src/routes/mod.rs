use axum::routing::get;
use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod crm;
pub mod records;
pub mod stats;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/api/ping", get(|| async { "pong" }))
        .merge(auth::router())
        .merge(records::router())
        .merge(stats::router())
        .merge(crm::router())
}
