use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;

/// Replace `path` with whatever `write` produces.
///
/// The new content goes to a temporary file in the same directory which is then
/// renamed over the original, so readers see either the old or the new file.
pub(crate) fn replace_with<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = tempfile::Builder::new()
        .prefix(".sanitize-")
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;

    write(temp.as_file_mut())?;
    temp.as_file()
        .sync_all()
        .context("Failed to sync temporary file")?;

    temp.persist(path)
        .map_err(|e| anyhow::anyhow!("Failed to replace {}: {}", path.display(), e.error))?;

    Ok(())
}
