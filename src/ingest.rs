//! Data-driven ingestion: builds the parameterized INSERT for a schema
//! entry and coerces a normalized payload into its positional parameters.
//! Values are always bound, never interpolated; placeholders carry an
//! explicit cast per field kind so the database applies the final typing.

use serde_json::{Map, Value};

use crate::error::ApiResult;
use crate::registry::{FieldKind, RecordSchema};

fn cast(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Text => "",
        FieldKind::Numeric => "::double precision",
        FieldKind::Integer => "::int",
        FieldKind::Date => "::date",
        FieldKind::Time => "::time",
    }
}

/// Render the INSERT statement for a schema entry, with optional extra
/// columns appended after the registry-defined ones (used for stamping
/// `recorded_by` and for the drying-output derived fields).
pub fn insert_sql(schema: &RecordSchema, extra: &[(&str, FieldKind)]) -> String {
    let mut columns: Vec<&str> = schema.fields.iter().map(|f| f.column).collect();
    let mut kinds: Vec<FieldKind> = schema.fields.iter().map(|f| f.kind).collect();
    for (column, kind) in extra {
        columns.push(column);
        kinds.push(*kind);
    }
    let placeholders: Vec<String> = kinds
        .iter()
        .enumerate()
        .map(|(i, kind)| format!("${}{}", i + 1, cast(*kind)))
        .collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING id",
        schema.table,
        columns.join(", "),
        placeholders.join(", ")
    )
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        // Multi-select inputs (e.g. contaminants) arrive as arrays and are
        // stored comma-joined, matching how they are displayed back.
        Value::Array(items) => items
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

/// Positional parameters in registry column order, with registry defaults
/// substituted for absent optional fields. Assumes the payload already
/// passed validation.
pub fn param_values(schema: &RecordSchema, payload: &Map<String, Value>) -> Vec<Option<String>> {
    schema
        .fields
        .iter()
        .map(|field| match payload.get(field.field) {
            None | Some(Value::Null) => field.default.map(str::to_string),
            Some(Value::String(s)) if s.trim().is_empty() => field.default.map(str::to_string),
            Some(value) => {
                let raw = scalar(value);
                if field.kind == FieldKind::Text {
                    Some(raw)
                } else {
                    Some(raw.trim().to_string())
                }
            }
        })
        .collect()
}

/// Run a registry-driven insert and return the generated identifier.
/// `recorded_by` is appended as an extra column when the schema stamps
/// the authenticated principal.
pub async fn insert_record<'e, E>(
    executor: E,
    schema: &RecordSchema,
    payload: &Map<String, Value>,
    recorded_by: Option<&str>,
) -> ApiResult<i32>
where
    E: sqlx::PgExecutor<'e>,
{
    let extra: &[(&str, FieldKind)] = if recorded_by.is_some() {
        &[("recorded_by", FieldKind::Text)]
    } else {
        &[]
    };
    let sql = insert_sql(schema, extra);
    let mut query = sqlx::query_scalar::<_, i32>(&sql);
    for param in param_values(schema, payload) {
        query = query.bind(param);
    }
    if let Some(user) = recorded_by {
        query = query.bind(user.to_string());
    }
    Ok(query.fetch_one(executor).await?)
}

/// Derived fields for a drying-output record: the wet:dry ratio string
/// ("N/A" when nothing was produced) and the yield percentage (0 when no
/// wet weight was placed for the batch).
pub fn drying_ratio_and_yield(total_wet: f64, dried: f64) -> (String, f64) {
    let actual_ratio = if dried > 0.0 {
        format!("{}:{}", fmt_weight(total_wet), fmt_weight(dried))
    } else {
        "N/A".to_string()
    };
    let yield_percentage = if total_wet > 0.0 {
        dried / total_wet * 100.0
    } else {
        0.0
    };
    (actual_ratio, yield_percentage)
}

fn fmt_weight(w: f64) -> String {
    if w.fract() == 0.0 {
        format!("{}", w as i64)
    } else {
        format!("{}", w)
    }
}
