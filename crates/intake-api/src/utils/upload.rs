//! Multipart parsing for source uploads

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use intake_core::AppError;
use intake_services::UploadedFile;

pub const FILE_FIELD: &str = "file";
pub const SOURCE_TYPE_FIELD: &str = "source_type";

/// Upload form fields. A missing file is not an error here; the ingestion service
/// records it as an attempt before rejecting.
#[derive(Debug)]
pub struct UploadForm {
    pub source_type: String,
    pub file: Option<UploadedFile>,
}

/// Read `file` and `source_type`. Other fields are ignored; more than one `file`
/// field is rejected.
pub async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut source_type: Option<String> = None;
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);

        match name.as_deref() {
            Some(FILE_FIELD) => {
                if file.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    ));
                }
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some(UploadedFile::new(file_name, data));
            }
            Some(SOURCE_TYPE_FIELD) => {
                source_type = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {
                tracing::debug!(field = ?name, "Ignoring unexpected multipart field");
            }
        }
    }

    Ok(UploadForm {
        source_type: source_type.unwrap_or_default(),
        file,
    })
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body exceeds the upload size limit".to_string())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
    }
}
