use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Scope guard for an upload's working file.
///
/// The file is removed when the guard is dropped unless [`WorkingFile::keep`] was
/// called, so every early return out of the pipeline cleans up after itself.
#[derive(Debug)]
pub struct WorkingFile {
    path: PathBuf,
    armed: bool,
}

impl WorkingFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file now.
    pub async fn discard(mut self) {
        self.armed = false;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Working file removed"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove working file"
            ),
        }
    }

    /// Keep the file as the permanent copy and return its path.
    pub fn keep(mut self) -> PathBuf {
        self.armed = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for WorkingFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Working file removed on drop"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove working file on drop"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.pdf");
        std::fs::write(&path, b"x").unwrap();

        {
            let _guard = WorkingFile::new(path.clone());
        }

        assert!(!path.exists());
    }

    #[test]
    fn test_keep_leaves_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.pdf");
        std::fs::write(&path, b"x").unwrap();

        let kept = WorkingFile::new(path.clone()).keep();

        assert_eq!(kept, path);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_discard_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let guard = WorkingFile::new(dir.path().join("never-written.pdf"));
        guard.discard().await;
    }

    #[test]
    fn test_drop_without_file_is_quiet() {
        let dir = tempfile::tempdir().unwrap();
        drop(WorkingFile::new(dir.path().join("missing.png")));
    }
}
