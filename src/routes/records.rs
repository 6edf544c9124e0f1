//! Routes for every registry-defined record type. Creation and listing
//! handlers are generated from the registry; only drying output gets a
//! dedicated creation handler because it derives columns inside a
//! transaction.

use axum::extract::State;
use axum::routing::{get, post, MethodRouter};
use axum::{Extension, Json, Router};
use serde_json::Value;

use crate::commands::{drying, records};
use crate::middleware::auth::Claims;
use crate::registry::{self, RecordSchema};
use crate::state::AppState;

fn create_route(schema: &'static RecordSchema) -> MethodRouter<AppState> {
    post(
        move |State(state): State<AppState>,
              Extension(claims): Extension<Claims>,
              Json(payload): Json<Value>| async move {
            records::create_record(schema, state, claims, payload).await
        },
    )
}

fn list_route(schema: &'static RecordSchema) -> MethodRouter<AppState> {
    get(move |State(state): State<AppState>| async move {
        records::list_records(schema, state).await
    })
}

pub fn router() -> Router<AppState> {
    let mut router = Router::new();
    for schema in registry::SCHEMAS {
        if schema.route != "drying/output" {
            router = router.route(&format!("/api/{}", schema.route), create_route(schema));
            for alias in schema.aliases {
                router = router.route(&format!("/api/{}", alias), create_route(schema));
            }
        }
        router = router.route(&format!("/api/{}/all", schema.route), list_route(schema));
        for alias in schema.aliases {
            router = router.route(&format!("/api/{}/all", alias), list_route(schema));
        }
    }
    router
        .route("/api/drying/output", post(drying::create_drying_output))
        .route("/api/records", get(records::records_by_date))
}
