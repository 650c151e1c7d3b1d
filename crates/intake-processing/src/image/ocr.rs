//! OCR through the `tesseract` command-line tool

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

/// Run `tesseract <path> stdout` and return the recognized text.
pub async fn recognize_text(binary: &str, path: &Path, timeout: Duration) -> Result<String> {
    let run = Command::new(binary)
        .arg(path)
        .arg("stdout")
        .kill_on_drop(true)
        .output();

    let output = tokio::time::timeout(timeout, run)
        .await
        .map_err(|_| anyhow::anyhow!("OCR timed out after {}s", timeout.as_secs()))?
        .with_context(|| format!("Failed to run OCR binary '{}'", binary))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("OCR exited with {}: {}", output.status, stderr.trim());
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_an_error() {
        let result = recognize_text(
            "/nonexistent/tesseract-binary",
            Path::new("image.png"),
            Duration::from_secs(5),
        )
        .await;

        let err = result.unwrap_err().to_string();
        assert!(err.contains("Failed to run OCR binary"));
    }
}
