use crate::auth::{RequestOrigin, RequirePrincipal};
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    delete,
    path = "/api/v0/sources/{id}",
    tag = "sources",
    params(
        ("id" = Uuid, Path, description = "Source ID")
    ),
    responses(
        (status = 204, description = "Source, extracted data and stored file removed"),
        (status = 401, description = "No authenticated principal", body = ErrorResponse),
        (status = 403, description = "Source belongs to another principal", body = ErrorResponse),
        (status = 404, description = "Source not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, origin), fields(principal_id = %principal.0, source_id = %id))]
pub async fn delete_source(
    State(state): State<Arc<AppState>>,
    principal: RequirePrincipal,
    RequestOrigin(origin): RequestOrigin,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HttpAppError> {
    state
        .ingestion
        .delete_source(id, principal.0, &origin)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
