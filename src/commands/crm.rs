//! Customer relationship endpoints: customers, sales, deliveries and
//! feedback. These take typed request bodies rather than going through the
//! schema registry, because they reference other rows and trigger email
//! notifications.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::rows_to_json;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CustomerContact {
    pub(crate) name: String,
    pub(crate) email: Option<String>,
    pub(crate) address: Option<String>,
}

async fn fetch_customer(state: &AppState, customer_id: i32) -> ApiResult<CustomerContact> {
    sqlx::query_as("SELECT name, email, address FROM customers WHERE id = $1")
        .bind(customer_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Customer not found".to_string()))
}

// --- Customers ---

#[derive(Debug, Deserialize)]
pub struct CustomerInput {
    pub name: String,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

pub async fn list_customers(State(state): State<AppState>) -> ApiResult<Json<Vec<Value>>> {
    let rows = sqlx::query("SELECT * FROM customers ORDER BY name")
        .fetch_all(&state.pool)
        .await?;
    Ok(Json(rows_to_json(&rows)))
}

pub async fn create_customer(
    State(state): State<AppState>,
    Json(input): Json<CustomerInput>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::Validation("Customer name is required".to_string()));
    }

    let duplicate: Option<i32> = sqlx::query_scalar(
        "SELECT id FROM customers WHERE name = $1 AND email IS NOT DISTINCT FROM $2",
    )
    .bind(&name)
    .bind(&input.email)
    .fetch_optional(&state.pool)
    .await?;
    if duplicate.is_some() {
        return Err(ApiError::Conflict(
            "Customer with this name and email already exists.".to_string(),
        ));
    }

    let id: i32 = sqlx::query_scalar(
        "INSERT INTO customers (name, contact, email, address) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(&name)
    .bind(&input.contact)
    .bind(&input.email)
    .bind(&input.address)
    .fetch_one(&state.pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"success": true, "message": "Customer added successfully", "id": id})),
    ))
}

pub async fn update_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<i32>,
    Json(input): Json<CustomerInput>,
) -> ApiResult<Json<Value>> {
    let result = sqlx::query(
        "UPDATE customers SET name = $1, contact = $2, email = $3, address = $4 WHERE id = $5",
    )
    .bind(input.name.trim())
    .bind(&input.contact)
    .bind(&input.email)
    .bind(&input.address)
    .bind(customer_id)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Customer not found".to_string()));
    }
    Ok(Json(json!({"success": true, "message": "Customer updated successfully"})))
}

// --- Sales ---

#[derive(Debug, Deserialize)]
pub struct SaleInput {
    pub date: NaiveDate,
    #[serde(default, alias = "customer")]
    pub customer_id: Option<i32>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    pub amount: f64,
}

pub async fn list_sales(State(state): State<AppState>) -> ApiResult<Json<Vec<Value>>> {
    let rows = sqlx::query(
        "SELECT s.*, c.name AS customer_name
         FROM sales s JOIN customers c ON c.id = s.customer_id
         ORDER BY s.date DESC, s.id DESC",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(rows_to_json(&rows)))
}

fn sale_confirmation_body(customer: &CustomerContact, input: &SaleInput) -> String {
    format!(
        "Dear {},\n\n\
         Thank you for your purchase! Here are your sale details:\n\
         Date: {}\n\
         Product/Service: {}\n\
         Quantity: {}\n\
         Amount: {}\n\
         Delivery Address: {}\n\n\
         Best regards,\nBSF Farm Manager",
        customer.name,
        input.date,
        input.product.as_deref().unwrap_or(""),
        input.quantity.map(|q| q.to_string()).unwrap_or_default(),
        input.amount,
        customer.address.as_deref().unwrap_or(""),
    )
}

pub async fn create_sale(
    State(state): State<AppState>,
    Json(input): Json<SaleInput>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let customer_id = input
        .customer_id
        .ok_or_else(|| ApiError::Validation("customer_id is required".to_string()))?;
    let customer = fetch_customer(&state, customer_id).await?;

    let id: i32 = sqlx::query_scalar(
        "INSERT INTO sales (date, customer_id, product, quantity, amount)
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(input.date)
    .bind(customer_id)
    .bind(&input.product)
    .bind(input.quantity)
    .bind(input.amount)
    .fetch_one(&state.pool)
    .await?;

    state.mailer.notify(
        &format!("Sale Confirmation for {}", customer.name),
        &sale_confirmation_body(&customer, &input),
        state.mailer.customer_recipients(customer.email.as_deref()),
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({"success": true, "message": "Sale recorded successfully", "id": id})),
    ))
}

pub async fn update_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<i32>,
    Json(input): Json<SaleInput>,
) -> ApiResult<Json<Value>> {
    let customer_id = input
        .customer_id
        .ok_or_else(|| ApiError::Validation("customer_id is required".to_string()))?;
    fetch_customer(&state, customer_id).await?;

    let result = sqlx::query(
        "UPDATE sales SET date = $1, customer_id = $2, product = $3, quantity = $4, amount = $5
         WHERE id = $6",
    )
    .bind(input.date)
    .bind(customer_id)
    .bind(&input.product)
    .bind(input.quantity)
    .bind(input.amount)
    .bind(sale_id)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Sale not found".to_string()));
    }
    Ok(Json(json!({"success": true, "message": "Sale updated successfully"})))
}

// --- Deliveries ---

#[derive(Debug, Deserialize)]
pub struct DeliveryInput {
    pub date: NaiveDate,
    #[serde(default, alias = "customer")]
    pub customer_id: Option<i32>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// The completion email on the update path fires only on a transition
/// into "Delivered" (any casing, surrounding whitespace ignored) from a
/// state that was not already delivered. Creation does not consult this
/// rule; every newly created delivery announces its status.
pub fn should_notify_delivery(previous: &str, new_status: &str) -> bool {
    let delivered = |s: &str| s.trim().eq_ignore_ascii_case("delivered");
    delivered(new_status) && !delivered(previous)
}

/// Subject and body for a delivery write, or `None` when the write
/// warrants no mail. `previous` is absent on creation.
pub(crate) fn delivery_notification(
    customer: &CustomerContact,
    input: &DeliveryInput,
    previous: Option<&str>,
) -> Option<(String, String)> {
    match previous {
        None => Some((
            format!("Delivery Update for {}", customer.name),
            format!(
                "Dear {},\n\n\
                 Your delivery status is now: {}\n\
                 Date of Delivery: {}\n\
                 Product/Service: {}\n\
                 Quantity: {}\n\
                 Delivery Address: {}\n\n\
                 Best regards,\nBSF Farm Manager",
                customer.name,
                input.status,
                input.date,
                input.product.as_deref().unwrap_or(""),
                input.quantity.map(|q| q.to_string()).unwrap_or_default(),
                customer.address.as_deref().unwrap_or(""),
            ),
        )),
        Some(prev) if should_notify_delivery(prev, &input.status) => Some((
            format!("Delivery Confirmation for {}", customer.name),
            format!(
                "Dear {},\n\n\
                 Your delivery has been completed. Here are your delivery details:\n\
                 Date of Delivery: {}\n\
                 Product/Service: {}\n\
                 Quantity: {}\n\
                 Delivery Address: {}\n\n\
                 Best regards,\nBSF Farm Manager",
                customer.name,
                input.date,
                input.product.as_deref().unwrap_or(""),
                input.quantity.map(|q| q.to_string()).unwrap_or_default(),
                customer.address.as_deref().unwrap_or(""),
            ),
        )),
        _ => None,
    }
}

pub async fn list_deliveries(State(state): State<AppState>) -> ApiResult<Json<Vec<Value>>> {
    let rows = sqlx::query(
        "SELECT d.*, c.name AS customer_name
         FROM deliveries d JOIN customers c ON c.id = d.customer_id
         ORDER BY d.date DESC, d.id DESC",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(rows_to_json(&rows)))
}

pub async fn create_delivery(
    State(state): State<AppState>,
    Json(input): Json<DeliveryInput>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let customer_id = input
        .customer_id
        .ok_or_else(|| ApiError::Validation("customer_id is required".to_string()))?;
    let customer = fetch_customer(&state, customer_id).await?;

    let id: i32 = sqlx::query_scalar(
        "INSERT INTO deliveries (date, customer_id, product, quantity, status, notes)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
    )
    .bind(input.date)
    .bind(customer_id)
    .bind(&input.product)
    .bind(input.quantity)
    .bind(&input.status)
    .bind(&input.notes)
    .fetch_one(&state.pool)
    .await?;

    if let Some((subject, body)) = delivery_notification(&customer, &input, None) {
        state.mailer.notify(
            &subject,
            &body,
            state.mailer.customer_recipients(customer.email.as_deref()),
        );
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({"success": true, "message": "Delivery recorded successfully", "id": id})),
    ))
}

pub async fn update_delivery(
    State(state): State<AppState>,
    Path(delivery_id): Path<i32>,
    Json(input): Json<DeliveryInput>,
) -> ApiResult<Json<Value>> {
    let customer_id = input
        .customer_id
        .ok_or_else(|| ApiError::Validation("customer_id is required".to_string()))?;
    let customer = fetch_customer(&state, customer_id).await?;

    let previous: String = sqlx::query_scalar("SELECT status FROM deliveries WHERE id = $1")
        .bind(delivery_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Delivery not found".to_string()))?;

    sqlx::query(
        "UPDATE deliveries
         SET date = $1, customer_id = $2, product = $3, quantity = $4, status = $5, notes = $6
         WHERE id = $7",
    )
    .bind(input.date)
    .bind(customer_id)
    .bind(&input.product)
    .bind(input.quantity)
    .bind(&input.status)
    .bind(&input.notes)
    .bind(delivery_id)
    .execute(&state.pool)
    .await?;

    if let Some((subject, body)) = delivery_notification(&customer, &input, Some(&previous)) {
        state.mailer.notify(
            &subject,
            &body,
            state.mailer.customer_recipients(customer.email.as_deref()),
        );
    }

    Ok(Json(json!({"success": true, "message": "Delivery updated successfully"})))
}

// --- Feedback ---

#[derive(Debug, Deserialize)]
pub struct FeedbackInput {
    pub date: NaiveDate,
    #[serde(alias = "customer")]
    pub customer_id: Option<i32>,
    pub feedback: String,
    pub rating: i32,
}

pub async fn list_feedback(State(state): State<AppState>) -> ApiResult<Json<Vec<Value>>> {
    let rows = sqlx::query(
        "SELECT f.*, c.name AS customer_name
         FROM customer_feedback f JOIN customers c ON c.id = f.customer_id
         ORDER BY f.date DESC, f.id DESC",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(rows_to_json(&rows)))
}

pub async fn create_feedback(
    State(state): State<AppState>,
    Json(input): Json<FeedbackInput>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let customer_id = input
        .customer_id
        .ok_or_else(|| ApiError::Validation("customer_id is required".to_string()))?;
    fetch_customer(&state, customer_id).await?;

    let id: i32 = sqlx::query_scalar(
        "INSERT INTO customer_feedback (date, customer_id, feedback, rating)
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(input.date)
    .bind(customer_id)
    .bind(&input.feedback)
    .bind(input.rating)
    .fetch_one(&state.pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"success": true, "message": "Feedback recorded successfully", "id": id})),
    ))
}

pub async fn update_feedback(
    State(state): State<AppState>,
    Path(feedback_id): Path<i32>,
    Json(input): Json<FeedbackInput>,
) -> ApiResult<Json<Value>> {
    let customer_id = input
        .customer_id
        .ok_or_else(|| ApiError::Validation("customer_id is required".to_string()))?;
    fetch_customer(&state, customer_id).await?;

    let result = sqlx::query(
        "UPDATE customer_feedback SET date = $1, customer_id = $2, feedback = $3, rating = $4
         WHERE id = $5",
    )
    .bind(input.date)
    .bind(customer_id)
    .bind(&input.feedback)
    .bind(input.rating)
    .bind(feedback_id)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Feedback not found".to_string()));
    }
    Ok(Json(json!({"success": true, "message": "Feedback updated successfully"})))
}
