//! Aggregate reporting endpoints. Each handler is a thin wrapper around
//! one or a few aggregate queries; the derived-metric arithmetic lives in
//! free functions so it can be tested without a database.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::state::AppState;

/// Target wet:dry ratio the farm aims for (3 kg wet per 1 kg dried).
const TARGET_RATIO: f64 = 3.0;

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct DailyProcessing {
    pub date: NaiveDate,
    pub total_processed: Option<f64>,
    pub total_by_products: Option<f64>,
}

pub async fn waste_processing(State(state): State<AppState>) -> ApiResult<Json<Vec<DailyProcessing>>> {
    let stats = sqlx::query_as(
        "SELECT processing_date AS date,
                SUM(waste_processed) AS total_processed,
                SUM(by_products) AS total_by_products
         FROM processing_records
         GROUP BY processing_date
         ORDER BY date DESC
         LIMIT 30",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(stats))
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct DailyEnvironment {
    pub date: NaiveDate,
    pub avg_temperature: Option<f64>,
    pub avg_humidity: Option<f64>,
}

pub async fn environmental(State(state): State<AppState>) -> ApiResult<Json<Vec<DailyEnvironment>>> {
    let stats = sqlx::query_as(
        "SELECT monitoring_date AS date,
                AVG(temperature) AS avg_temperature,
                AVG(humidity) AS avg_humidity
         FROM environmental_monitoring_waste
         GROUP BY monitoring_date
         ORDER BY date DESC
         LIMIT 30",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(stats))
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct DailyLarvalGrowth {
    pub date: NaiveDate,
    pub avg_weight: Option<f64>,
    pub avg_consumption: Option<f64>,
}

pub async fn larval_growth(State(state): State<AppState>) -> ApiResult<Json<Vec<DailyLarvalGrowth>>> {
    let stats = sqlx::query_as(
        "SELECT feeding_date AS date,
                AVG(larvae_weight_g) AS avg_weight,
                AVG(consumption_g) AS avg_consumption
         FROM feeding_schedule
         GROUP BY feeding_date
         ORDER BY date DESC
         LIMIT 30",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(stats))
}

/// Conversion ratio of the whole system: useful output (larvae + compost)
/// per unit of waste taken in. Zero when nothing has been sourced yet.
pub fn overall_efficiency(waste_in: f64, larvae_out: f64, compost_out: f64) -> f64 {
    if waste_in > 0.0 {
        (larvae_out + compost_out) / waste_in
    } else {
        0.0
    }
}

pub async fn system_efficiency(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let waste_in: f64 =
        sqlx::query_scalar("SELECT COALESCE(SUM(waste_weight), 0) FROM waste_sourcing")
            .fetch_one(&state.pool)
            .await?;
    let larvae_out: f64 =
        sqlx::query_scalar("SELECT COALESCE(SUM(larvae_collected_kg), 0) FROM feeding_harvest_yield")
            .fetch_one(&state.pool)
            .await?;
    let compost_out: f64 =
        sqlx::query_scalar("SELECT COALESCE(SUM(by_products), 0) FROM processing_records")
            .fetch_one(&state.pool)
            .await?;

    Ok(Json(json!({
        "total_waste_in": waste_in,
        "total_larvae_out": larvae_out,
        "total_compost_out": compost_out,
        "overall_efficiency": overall_efficiency(waste_in, larvae_out, compost_out),
    })))
}

pub async fn daily_report(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let today = Local::now().date_naive();

    let waste_sourced: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(waste_weight), 0) FROM waste_sourcing WHERE collection_date = $1",
    )
    .bind(today)
    .fetch_one(&state.pool)
    .await?;
    let larvae_harvested: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(larvae_collected_kg), 0) FROM feeding_harvest_yield WHERE harvest_date = $1",
    )
    .bind(today)
    .fetch_one(&state.pool)
    .await?;
    let feed_given: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(feed_quantity_kg), 0) FROM feeding_schedule WHERE feeding_date = $1",
    )
    .bind(today)
    .fetch_one(&state.pool)
    .await?;
    let eggs_collected: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(eggs_collected_g), 0) FROM fly_facility_egg_collection WHERE collection_date = $1",
    )
    .bind(today)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(json!({
        "waste_sourced_today": waste_sourced,
        "larvae_harvested_today": larvae_harvested,
        "feed_given_today": feed_given,
        "eggs_collected_today": eggs_collected,
    })))
}

#[derive(Debug, sqlx::FromRow)]
struct BatchDrying {
    batch_id: String,
    output_date: Option<DateTime<Utc>>,
    total_wet: Option<f64>,
    total_dried: Option<f64>,
}

/// Ratio string and efficiency percentage for one batch against the
/// target. A batch with no dried output reports "N/A" and 0.
pub fn batch_efficiency(total_wet: Option<f64>, total_dried: Option<f64>) -> (String, f64) {
    match (total_wet, total_dried) {
        (Some(wet), Some(dried)) if dried > 0.0 => {
            let ratio = wet / dried;
            let efficiency = TARGET_RATIO / ratio * 100.0;
            (format!("{:.2}:1", ratio), (efficiency * 100.0).round() / 100.0)
        }
        _ => ("N/A".to_string(), 0.0),
    }
}

pub async fn harvest_efficiency(State(state): State<AppState>) -> ApiResult<Json<Vec<Value>>> {
    let batches: Vec<BatchDrying> = sqlx::query_as(
        "SELECT di.batch_id,
                MAX(dout.created_at) AS output_date,
                SUM(di.wet_placed_for_drying_kg) AS total_wet,
                SUM(dout.dried_produced_kg) AS total_dried
         FROM drying_input di
         JOIN drying_output dout ON dout.batch_id = di.batch_id
         GROUP BY di.batch_id
         ORDER BY output_date",
    )
    .fetch_all(&state.pool)
    .await?;

    let report = batches
        .into_iter()
        .map(|batch| {
            let (actual_ratio, efficiency) =
                batch_efficiency(batch.total_wet, batch.total_dried);
            json!({
                "batch_id": batch.batch_id,
                "date": batch.output_date.map(|d| d.date_naive().to_string()),
                "actual_ratio": actual_ratio,
                "target_ratio": format!("{}:1", TARGET_RATIO as i64),
                "efficiency_percentage": efficiency,
            })
        })
        .collect();

    Ok(Json(report))
}

#[derive(Debug, sqlx::FromRow)]
struct HarvestRow {
    harvest_date: NaiveDate,
    tray_batch_id: String,
    larvae_collected_kg: f64,
    processing_method: String,
}

/// Compose a plain-text harvest summary and mail it to the admin address.
pub async fn send_harvest_report(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let harvests: Vec<HarvestRow> = sqlx::query_as(
        "SELECT harvest_date, tray_batch_id, larvae_collected_kg, processing_method
         FROM feeding_harvest_yield
         ORDER BY harvest_date DESC",
    )
    .fetch_all(&state.pool)
    .await?;

    let today = Local::now().date_naive();
    let total: f64 = harvests.iter().map(|h| h.larvae_collected_kg).sum();
    let mut body = format!("Harvest Yield Report ({})\n\n", today);
    body.push_str(&format!(
        "Total harvested to date: {:.2} kg across {} harvests\n\n",
        total,
        harvests.len()
    ));
    for harvest in &harvests {
        body.push_str(&format!(
            "{} | batch {} | {:.2} kg | {}\n",
            harvest.harvest_date,
            harvest.tray_batch_id,
            harvest.larvae_collected_kg,
            harvest.processing_method
        ));
    }

    state.mailer.notify(
        &format!("Harvest Yield Report ({})", today),
        &body,
        state.mailer.admin_recipients(),
    );

    Ok(Json(json!({
        "success": true,
        "message": "Harvest report sent to admin.",
    })))
}
