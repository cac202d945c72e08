use std::path::Path;
use std::sync::Arc;

use sprintboard_persistence::{EntityStore, JsonFileStore};

use crate::cli::Backend;

pub async fn open(backend: Backend, path: &Path) -> anyhow::Result<Arc<dyn EntityStore>> {
    tracing::debug!(?backend, path = %path.display(), "Opening store");
    match backend {
        Backend::Json => Ok(Arc::new(JsonFileStore::open(path).await?)),
        Backend::Sqlite => open_sqlite(path),
    }
}

#[cfg(feature = "sqlite")]
fn open_sqlite(path: &Path) -> anyhow::Result<Arc<dyn EntityStore>> {
    Ok(Arc::new(sprintboard_persistence::SqliteStore::new(path)))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite(_path: &Path) -> anyhow::Result<Arc<dyn EntityStore>> {
    anyhow::bail!("SQLite backend not available: rebuild with --features sqlite")
}
