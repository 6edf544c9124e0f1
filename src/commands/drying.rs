//! Dedicated create handler for drying output records. Unlike the generic
//! ingestion path it derives two columns from existing data: the wet:dry
//! ratio against the batch's accumulated input weight, and the yield
//! percentage. The read and the insert run in one transaction so a
//! concurrent input insert cannot slip between them.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::ingest;
use crate::middleware::auth::Claims;
use crate::normalize::normalize_keys;
use crate::registry::{self, FieldKind};
use crate::state::AppState;
use crate::validate::{to_message, validate};

pub async fn create_drying_output(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<Value>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let schema = registry::find("drying/output")
        .ok_or_else(|| ApiError::Internal("drying output schema missing".to_string()))?;

    let normalized = normalize_keys(payload);
    let map = normalized
        .as_object()
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::Validation("No data provided".to_string()))?;

    let issues = validate(map, schema);
    if !issues.is_empty() {
        return Err(ApiError::Validation(to_message(&issues)));
    }

    let params = ingest::param_values(schema, map);
    let batch_id = params
        .first()
        .cloned()
        .flatten()
        .ok_or_else(|| ApiError::Validation("Missing required fields: batch_id".to_string()))?;
    let dried_produced: f64 = params
        .get(1)
        .and_then(|p| p.as_deref())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.0);

    let mut tx = state.pool.begin().await?;

    let total_wet: Option<f64> = sqlx::query_scalar(
        "SELECT SUM(wet_placed_for_drying_kg) FROM drying_input WHERE batch_id = $1",
    )
    .bind(&batch_id)
    .fetch_one(&mut *tx)
    .await?;
    let total_wet = total_wet.unwrap_or(0.0);

    let (actual_ratio, yield_percentage) =
        ingest::drying_ratio_and_yield(total_wet, dried_produced);

    let sql = ingest::insert_sql(
        schema,
        &[
            ("actual_ratio", FieldKind::Text),
            ("yield_percentage", FieldKind::Numeric),
            ("recorded_by", FieldKind::Text),
        ],
    );
    let mut query = sqlx::query_scalar::<_, i32>(&sql);
    for param in params {
        query = query.bind(param);
    }
    let id = query
        .bind(&actual_ratio)
        .bind(yield_percentage.to_string())
        .bind(&claims.username)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::info!(
        "drying output {} saved for batch {} (ratio {}, yield {:.2}%)",
        id,
        batch_id,
        actual_ratio,
        yield_percentage
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Drying output recorded successfully",
            "id": id,
            "actual_ratio": actual_ratio,
            "yield_percentage": yield_percentage,
        })),
    ))
}
