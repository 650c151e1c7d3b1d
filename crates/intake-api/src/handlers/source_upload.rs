use crate::auth::{MaybePrincipal, RequestOrigin};
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::read_upload_form;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use intake_core::models::{ScanOutcome, SourceType};
use intake_services::{IngestionReceipt, UploadRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub message: String,
    pub source_id: Uuid,
    pub extracted_data_id: Uuid,
    pub source_type: SourceType,
    pub file_name: String,
    /// sha256 of the sanitized file as stored
    pub file_hash: String,
    /// sha256 of the canonical extracted document
    pub content_hash: String,
    pub scan: ScanOutcome,
    /// Extracted document, sanitized
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
}

impl From<IngestionReceipt> for UploadResponse {
    fn from(receipt: IngestionReceipt) -> Self {
        Self {
            message: receipt.message,
            source_id: receipt.source.id,
            extracted_data_id: receipt.extracted.id,
            source_type: receipt.source.source_type,
            file_name: receipt.source.file_name,
            file_hash: receipt.source.file_hash,
            content_hash: receipt.extracted.content_hash,
            scan: receipt.scan,
            data: receipt.extracted.data,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v0/sources",
    tag = "sources",
    request_body(content_type = "multipart/form-data", description = "Fields: file, source_type (pdf, image or excel)"),
    responses(
        (status = 201, description = "File accepted, sanitized and extracted", body = UploadResponse),
        (status = 400, description = "Malformed request", body = ErrorResponse),
        (status = 401, description = "No authenticated principal", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Extension not allowed for the declared type", body = ErrorResponse),
        (status = 422, description = "Malware detected, or sanitization/extraction failed", body = ErrorResponse),
        (status = 503, description = "Malware scanner unavailable (fail-closed policy)", body = ErrorResponse),
        (status = 500, description = "Persistence failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, origin, multipart), fields(principal_id = ?principal.0.map(|p| p.id())))]
pub async fn upload_source(
    State(state): State<Arc<AppState>>,
    principal: MaybePrincipal,
    RequestOrigin(origin): RequestOrigin,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), HttpAppError> {
    let form = read_upload_form(multipart).await?;

    let receipt = state
        .ingestion
        .ingest(UploadRequest {
            declared_type: form.source_type,
            file: form.file,
            principal: principal.0,
            meta: origin,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(receipt.into())))
}
