//! OpenAPI documentation, served at `/api/openapi.json`.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;
use intake_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Intake API",
        version = "0.1.0",
        description = "Secure file ingestion: type validation, malware scanning, sanitization, extraction and audit logging"
    ),
    paths(
        handlers::source_upload::upload_source,
        handlers::source_delete::delete_source,
        handlers::health::health_check,
    ),
    components(schemas(
        ErrorResponse,
        handlers::source_upload::UploadResponse,
        handlers::health::HealthResponse,
        models::SourceType,
        models::ScanOutcome,
        models::Verdict,
        models::StructuredDocument,
        models::PageText,
        models::SheetData,
    )),
    tags(
        (name = "sources", description = "Upload and undo of source files"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
