//! Registry-driven record ingestion and retrieval. One create handler and
//! one list handler serve every observation record type; the schema entry
//! supplies the table, validation rules and column mapping.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::db::rows_to_json;
use crate::error::{ApiError, ApiResult};
use crate::ingest;
use crate::middleware::auth::Claims;
use crate::normalize::normalize_keys;
use crate::registry::{self, RecordSchema, Section};
use crate::state::AppState;
use crate::validate::{to_message, validate};

pub async fn create_record(
    schema: &'static RecordSchema,
    state: AppState,
    claims: Claims,
    payload: Value,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let normalized = normalize_keys(payload);
    let map: &Map<String, Value> = normalized
        .as_object()
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::Validation("No data provided".to_string()))?;

    let issues = validate(map, schema);
    if !issues.is_empty() {
        return Err(ApiError::Validation(to_message(&issues)));
    }

    let recorded_by = schema.stamp_recorded_by.then_some(claims.username.as_str());
    let id = ingest::insert_record(&state.pool, schema, map, recorded_by).await?;
    tracing::info!("{} record {} saved by {}", schema.label, id, claims.username);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": format!("{} record saved successfully", schema.label),
            "id": id,
        })),
    ))
}

pub async fn list_records(
    schema: &'static RecordSchema,
    state: AppState,
) -> ApiResult<Json<Vec<Value>>> {
    let sql = format!(
        "SELECT * FROM {} ORDER BY {} DESC",
        schema.table, schema.date_column
    );
    let rows = sqlx::query(&sql).fetch_all(&state.pool).await?;
    Ok(Json(rows_to_json(&rows)))
}

#[derive(Debug, Deserialize)]
pub struct RecordsQuery {
    pub date: Option<String>,
    pub section: Option<String>,
}

/// Cross-table report: every record captured on a given day, grouped by
/// record-type label, optionally restricted to one dashboard section.
pub async fn records_by_date(
    State(state): State<AppState>,
    Query(query): Query<RecordsQuery>,
) -> ApiResult<Json<Value>> {
    let date_param = query
        .date
        .ok_or_else(|| ApiError::Validation("Date parameter is required".to_string()))?;
    let date = NaiveDate::parse_from_str(&date_param, "%Y-%m-%d")
        .map_err(|_| ApiError::Validation("Invalid date format. Please use YYYY-MM-DD.".to_string()))?;

    let section_param = query.section.unwrap_or_else(|| "all".to_string());
    let schemas: Vec<&'static RecordSchema> = if section_param == "all" {
        registry::SCHEMAS.iter().collect()
    } else {
        let section = Section::parse(&section_param)
            .ok_or_else(|| ApiError::Validation("Invalid section specified".to_string()))?;
        registry::in_section(section).collect()
    };

    let mut records = Map::new();
    for schema in schemas {
        let sql = format!(
            "SELECT * FROM {} WHERE {}::date = $1",
            schema.table, schema.date_column
        );
        let rows = sqlx::query(&sql).bind(date).fetch_all(&state.pool).await?;
        if !rows.is_empty() {
            records.insert(
                schema.label.to_string(),
                Value::Array(rows_to_json(&rows)),
            );
        }
    }

    Ok(Json(json!({"success": true, "records": records})))
}
