//! Pre-write checks on the declared type and the client-supplied file name

use intake_core::constants::MAX_FILENAME_LEN;
use intake_core::models::SourceType;
use intake_core::AppError;

/// Strip a client file name down to a safe display/storage name.
///
/// Names with path separators or a `..` component are rejected outright; other
/// characters outside `[A-Za-z0-9._-]` become `_`. Long names lose characters
/// from the stem, never from the extension.
pub fn sanitize_file_name(file_name: &str) -> Result<String, AppError> {
    let trimmed = file_name.trim();

    if trimmed == ".." || trimmed.contains('/') || trimmed.contains('\\') {
        return Err(AppError::InvalidInput(
            "Filename contains invalid path traversal".to_string(),
        ));
    }

    let sanitized: String = trimmed
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches(|c| c == '_' || c == '.').is_empty() {
        return Err(AppError::InvalidInput("Filename is empty".to_string()));
    }

    shorten(sanitized)
}

fn shorten(name: String) -> Result<String, AppError> {
    if name.chars().count() <= MAX_FILENAME_LEN {
        return Ok(name);
    }

    match name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => {
            let extension_len = extension.chars().count() + 1;
            if extension_len >= MAX_FILENAME_LEN {
                return Err(AppError::InvalidInput(
                    "Filename extension is too long".to_string(),
                ));
            }
            let stem: String = stem.chars().take(MAX_FILENAME_LEN - extension_len).collect();
            Ok(format!("{}.{}", stem, extension))
        }
        _ => Ok(name.chars().take(MAX_FILENAME_LEN).collect()),
    }
}

/// Lowercased extension without the dot, if the name has one.
pub fn file_extension(file_name: &str) -> Option<String> {
    let (stem, extension) = file_name.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    Some(extension.to_lowercase())
}

/// Parse the declared type and make sure the file extension is allowed for it.
pub fn check_declared_type(
    declared_type: &str,
    file_name: &str,
) -> Result<(SourceType, String), AppError> {
    let source_type: SourceType = declared_type.parse()?;

    let extension = file_extension(file_name).ok_or_else(|| {
        AppError::InvalidType(format!(
            "File '{}' has no extension. Allowed for {}: {}",
            file_name,
            source_type,
            source_type.allowed_extensions().join(", ")
        ))
    })?;

    if !source_type.accepts_extension(&extension) {
        return Err(AppError::InvalidType(format!(
            "Extension '.{}' is not allowed for {}. Allowed: {}",
            extension,
            source_type,
            source_type.allowed_extensions().join(", ")
        )));
    }

    Ok((source_type, extension))
}
