use sprintboard_core::{BoardError, BoardResult};
use std::path::Path;
use tokio::fs;

/// Whole-file writes that never leave a half-written data file behind.
pub struct AtomicWriter;

impl AtomicWriter {
    /// Write `data` to a sibling temp file, then rename it over `path`.
    /// Missing parent directories are created.
    pub async fn write_atomic(path: &Path, data: &[u8]) -> BoardResult<()> {
        let parent = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).await?;

        // Same directory keeps the rename on one filesystem.
        let temp_file = tempfile::NamedTempFile::new_in(parent)?;
        let temp_path = temp_file.into_temp_path();
        fs::write(&temp_path, data).await?;
        temp_path
            .persist(path)
            .map_err(|e| BoardError::Io(e.error))?;

        tracing::debug!("Wrote {} bytes to {}", data.len(), path.display());
        Ok(())
    }

    pub async fn read_all(path: &Path) -> BoardResult<Vec<u8>> {
        let data = fs::read(path).await?;
        tracing::debug!("Read {} bytes from {}", data.len(), path.display());
        Ok(data)
    }
}
