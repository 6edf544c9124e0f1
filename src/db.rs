use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::{json, Map, Value};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow, PgSslMode};
use sqlx::{Column, Pool, Postgres, Row, TypeInfo};

use crate::error::{ApiError, ApiResult};

pub type DbPool = Pool<Postgres>;

/// Fixed-size pool with a bounded acquire: exhaustion surfaces as
/// `sqlx::Error::PoolTimedOut` (mapped to a retryable 503) instead of
/// blocking the handler indefinitely.
pub async fn init_pool(database_url: &str) -> ApiResult<DbPool> {
    let opts = PgConnectOptions::from_str(database_url)
        .map_err(|e| ApiError::Internal(format!("Invalid DB URL: {}", e)))?
        .ssl_mode(PgSslMode::Prefer);

    Ok(PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(120))
        .connect_lazy_with(opts))
}

pub async fn init_database(pool: &DbPool) -> ApiResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Decode a row into an ordered column -> JSON value mapping. Temporal
/// columns serialize as ISO-8601 strings, numerics as JSON numbers.
pub fn row_to_json(row: &PgRow) -> Value {
    let mut map = Map::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let value = match column.type_info().name() {
            "INT2" => row
                .try_get::<Option<i16>, _>(idx)
                .ok()
                .flatten()
                .map(|v| json!(v)),
            "INT4" => row
                .try_get::<Option<i32>, _>(idx)
                .ok()
                .flatten()
                .map(|v| json!(v)),
            "INT8" => row
                .try_get::<Option<i64>, _>(idx)
                .ok()
                .flatten()
                .map(|v| json!(v)),
            "FLOAT4" => row
                .try_get::<Option<f32>, _>(idx)
                .ok()
                .flatten()
                .map(|v| json!(v)),
            "FLOAT8" => row
                .try_get::<Option<f64>, _>(idx)
                .ok()
                .flatten()
                .map(|v| json!(v)),
            "BOOL" => row
                .try_get::<Option<bool>, _>(idx)
                .ok()
                .flatten()
                .map(|v| json!(v)),
            "DATE" => row
                .try_get::<Option<NaiveDate>, _>(idx)
                .ok()
                .flatten()
                .map(|v| json!(v.to_string())),
            "TIME" => row
                .try_get::<Option<NaiveTime>, _>(idx)
                .ok()
                .flatten()
                .map(|v| json!(v.format("%H:%M:%S").to_string())),
            "TIMESTAMPTZ" => row
                .try_get::<Option<DateTime<Utc>>, _>(idx)
                .ok()
                .flatten()
                .map(|v| json!(v.to_rfc3339())),
            "TIMESTAMP" => row
                .try_get::<Option<NaiveDateTime>, _>(idx)
                .ok()
                .flatten()
                .map(|v| json!(v.format("%Y-%m-%dT%H:%M:%S").to_string())),
            _ => row
                .try_get::<Option<String>, _>(idx)
                .ok()
                .flatten()
                .map(|v| json!(v)),
        };
        map.insert(column.name().to_string(), value.unwrap_or(Value::Null));
    }
    Value::Object(map)
}

pub fn rows_to_json(rows: &[PgRow]) -> Vec<Value> {
    rows.iter().map(row_to_json).collect()
}
