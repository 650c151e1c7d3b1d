use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: String,
    /// `ok` or `unreachable`
    pub database: String,
    /// Active scanner backend
    pub scanner: String,
    /// Whether uploads are rejected when the scanner cannot give a verdict
    pub scanner_fail_closed: bool,
    /// Audit entries that could not be written since startup
    pub audit_failures: u64,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let database_ok = match state.ingestion.check_database().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "Health check: database unreachable");
            false
        }
    };

    let response = HealthResponse {
        status: if database_ok { "healthy" } else { "degraded" }.to_string(),
        database: if database_ok { "ok" } else { "unreachable" }.to_string(),
        scanner: state.ingestion.scanner_name().to_string(),
        scanner_fail_closed: state.ingestion.policy().scanner_fail_closed,
        audit_failures: state.ingestion.audit().failure_count(),
    };

    let status = if database_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
