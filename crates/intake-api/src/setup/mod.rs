//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod services;

use crate::state::AppState;
use anyhow::{Context, Result};
use intake_core::Config;
use std::sync::Arc;

/// Initialize tracing, database, services and routes.
pub async fn initialize_app(config: &Config) -> Result<(Arc<AppState>, axum::Router)> {
    intake_infra::init_telemetry(config.log_format())
        .context("Failed to initialize telemetry")?;

    config
        .validate()
        .context("Configuration validation failed")?;
    tracing::info!(environment = %config.environment(), "Configuration loaded and validated");

    let pool = database::setup_database(config).await?;
    let state = services::initialize_services(config, pool).await?;
    let router = routes::build_router(state.clone(), config.max_upload_size_bytes());

    Ok((state, router))
}
