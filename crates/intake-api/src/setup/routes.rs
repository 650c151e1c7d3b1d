//! Router construction

use crate::api_doc::ApiDoc;
use crate::handlers::{health::health_check, source_delete::delete_source, source_upload::upload_source};
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use intake_core::constants::API_PREFIX;
use intake_infra::middleware::{request_id_middleware, security_headers_middleware, SecurityHeaders};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Room for multipart boundaries and the `source_type` field on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn build_router(state: Arc<AppState>, max_upload_size_bytes: usize) -> Router {
    let body_limit = max_upload_size_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES);
    let security = SecurityHeaders {
        hsts: state.is_production,
    };

    let sources = Router::new()
        .route("/sources", post(upload_source))
        .route("/sources/{id}", delete(delete_source))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit));

    Router::new()
        .nest(API_PREFIX, sources)
        .route("/health", get(health_check))
        .route("/api/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(from_fn_with_state(security, security_headers_middleware))
        .layer(from_fn(request_id_middleware))
}
