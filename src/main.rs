use std::net::SocketAddr;

use dotenvy::dotenv;
use tower_http::cors::{Any, CorsLayer};

mod commands;
mod config;
mod db;
mod error;
mod ingest;
mod mailer;
mod middleware;
mod normalize;
mod registry;
mod routes;
mod state;
mod validate;

#[cfg(test)]
mod integration_tests;
#[cfg(test)]
mod pipeline_tests;

use config::Config;
use mailer::Mailer;
use state::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    tracing::info!("Starting BSF farm backend...");
    let config = Config::from_env();

    let pool = match db::init_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to configure database pool: {}", e);
            return;
        }
    };
    if let Err(e) = db::init_database(&pool).await {
        tracing::error!("Failed to run database migrations: {}", e);
        return;
    }
    tracing::info!("Database ready");

    let mailer = Mailer::from_config(&config);
    let app_state = AppState { pool, mailer };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::create_router()
        .layer(axum::middleware::from_fn(middleware::auth::auth_middleware))
        .layer(cors)
        .with_state(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
