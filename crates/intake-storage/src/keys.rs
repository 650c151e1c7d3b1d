//! Shared key generation for stored source files.

use intake_core::constants::SOURCE_KEY_PREFIX;
use uuid::Uuid;

/// Storage key for a source file: `sources/{principal_id}/{source_id}.{extension}`.
///
/// The original file name never appears in the key; only the validated extension does.
pub fn source_key(principal_id: Uuid, source_id: Uuid, extension: &str) -> String {
    format!(
        "{}/{}/{}.{}",
        SOURCE_KEY_PREFIX,
        principal_id,
        source_id,
        extension.trim_start_matches('.').to_lowercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_key_layout() {
        let principal = Uuid::new_v4();
        let source = Uuid::new_v4();
        let key = source_key(principal, source, ".PDF");
        assert_eq!(key, format!("sources/{}/{}.pdf", principal, source));
        assert!(!key.contains(".."));
    }
}
