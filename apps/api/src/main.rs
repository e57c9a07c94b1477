//! Hookwire API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use hookwire_application::{HookService, LogService};
use hookwire_core::AppError;
use hookwire_infrastructure::{
    PostgresHookRepository, PostgresLogRepository, ReqwestHookDeliveryClient,
};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let hook_repository = Arc::new(PostgresHookRepository::new(pool.clone()));
    let log_repository = Arc::new(PostgresLogRepository::new(pool));
    let http_client = reqwest::Client::builder()
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build http client: {error}")))?;
    let delivery_client = Arc::new(
        ReqwestHookDeliveryClient::new(http_client, config.hook_retry_backoff_ms)
            .with_timeout(config.hook_request_timeout),
    );

    let app_state = AppState {
        hook_service: HookService::new(
            hook_repository.clone(),
            hook_repository.clone(),
            hook_repository,
            log_repository.clone(),
            delivery_client,
        ),
        log_service: LogService::new(log_repository),
        admin_token: config.admin_token.clone(),
    };

    let app = api_router::build_router(app_state);
    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "hookwire-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
