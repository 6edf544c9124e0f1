use axum::{extract::State, http::StatusCode, Json};
use bcrypt::{hash, verify, DEFAULT_COST};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::create_token;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default, alias = "fullName")]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, alias = "confirmPassword")]
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// The frontend sends the email in a field named `username`.
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, alias = "rememberMe")]
    pub remember_me: bool,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: Option<String>,
    pub username: Option<String>,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    username: String,
    email: String,
    password_hash: String,
    is_active: bool,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let username = payload.username.trim().to_string();
    let full_name = payload.full_name.trim().to_string();
    let email = payload.email.trim().to_lowercase();
    let password = payload.password;
    let confirm_password = payload.confirm_password;

    if username.is_empty()
        || full_name.is_empty()
        || email.is_empty()
        || password.is_empty()
        || confirm_password.is_empty()
    {
        return Err(ApiError::Validation("All fields are required".to_string()));
    }
    if password != confirm_password {
        return Err(ApiError::Validation("Passwords do not match".to_string()));
    }

    let email_taken: Option<i32> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.pool)
        .await?;
    if email_taken.is_some() {
        return Err(ApiError::Conflict("Email is already registered".to_string()));
    }

    let username_taken: Option<i32> =
        sqlx::query_scalar("SELECT id FROM users WHERE username = $1")
            .bind(&username)
            .fetch_optional(&state.pool)
            .await?;
    if username_taken.is_some() {
        return Err(ApiError::Conflict("Username already taken".to_string()));
    }

    let password_hash = hash(&password, DEFAULT_COST)?;
    sqlx::query(
        "INSERT INTO users (username, full_name, email, password_hash) VALUES ($1, $2, $3, $4)",
    )
    .bind(&username)
    .bind(&full_name)
    .bind(&email)
    .bind(&password_hash)
    .execute(&state.pool)
    .await?;

    tracing::info!("registered user {}", username);
    Ok((
        StatusCode::CREATED,
        Json(json!({"success": true, "message": "Registration successful"})),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let email = payload.username.trim().to_lowercase();
    let password = payload.password;

    if email.is_empty() || password.is_empty() {
        return Err(ApiError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let user: Option<UserRow> = sqlx::query_as(
        "SELECT id, username, email, password_hash, is_active FROM users WHERE email = $1",
    )
    .bind(&email)
    .fetch_optional(&state.pool)
    .await?;

    let user = match user {
        Some(user) if user.is_active && verify(&password, &user.password_hash)? => user,
        _ => return Err(ApiError::Auth("Invalid email or password".to_string())),
    };

    sqlx::query("UPDATE users SET last_login = now() WHERE id = $1")
        .bind(user.id)
        .execute(&state.pool)
        .await?;

    let token = create_token(user.id, &user.username, &user.email, payload.remember_me)?;
    tracing::info!("user {} logged in", user.username);

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token: Some(token),
        username: Some(user.username),
    }))
}

pub async fn logout() -> Json<Value> {
    // Tokens are stateless; the client discards its copy.
    Json(json!({"success": true, "message": "Logged out"}))
}
