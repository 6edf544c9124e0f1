use axum::routing::{get, put};
use axum::Router;

use crate::commands::crm;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/customers", get(crm::list_customers).post(crm::create_customer))
        .route("/api/customers/:id", put(crm::update_customer))
        .route("/api/sales", get(crm::list_sales).post(crm::create_sale))
        .route("/api/sales/:id", put(crm::update_sale))
        .route("/api/deliveries", get(crm::list_deliveries).post(crm::create_delivery))
        .route("/api/deliveries/:id", put(crm::update_delivery))
        .route("/api/feedback", get(crm::list_feedback).post(crm::create_feedback))
        .route("/api/feedback/:id", put(crm::update_feedback))
}
