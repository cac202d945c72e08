use crate::store::atomic_writer::AtomicWriter;
use crate::store::board_data::BoardData;
use crate::store::table_store::{Journal, TableStore};
use crate::traits::{PersistenceMetadata, CURRENT_FORMAT_VERSION};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sprintboard_core::{BoardError, BoardResult};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// On-disk layout of the data file.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonEnvelope {
    pub version: u32,
    pub metadata: PersistenceMetadata,
    pub data: BoardData,
}

/// Journal that rewrites the whole data file after each mutation.
#[derive(Debug, Clone)]
pub struct JsonFileJournal {
    path: PathBuf,
    instance_id: Uuid,
}

impl JsonFileJournal {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            instance_id: Uuid::new_v4(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a data file written by any instance.
    pub async fn load(path: &Path) -> BoardResult<JsonEnvelope> {
        let bytes = AtomicWriter::read_all(path).await?;
        let envelope: JsonEnvelope = serde_json::from_slice(&bytes)
            .map_err(|e| BoardError::Serialization(e.to_string()))?;

        if envelope.version != CURRENT_FORMAT_VERSION {
            return Err(BoardError::Serialization(format!(
                "Unsupported format version: {}",
                envelope.version
            )));
        }
        Ok(envelope)
    }
}

#[async_trait]
impl Journal for JsonFileJournal {
    async fn record(&self, data: &BoardData) -> BoardResult<()> {
        let envelope = JsonEnvelope {
            version: CURRENT_FORMAT_VERSION,
            metadata: PersistenceMetadata::new(self.instance_id),
            data: data.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&envelope)
            .map_err(|e| BoardError::Serialization(e.to_string()))?;
        AtomicWriter::write_atomic(&self.path, &bytes).await
    }
}

pub type JsonFileStore = TableStore<JsonFileJournal>;

impl JsonFileStore {
    /// Open the data file at `path`, starting empty when it does not exist
    /// yet. The file itself is created on the first write.
    pub async fn open(path: impl AsRef<Path>) -> BoardResult<Self> {
        let journal = JsonFileJournal::new(path);
        let data = if journal.path().exists() {
            let envelope = JsonFileJournal::load(journal.path()).await?;
            tracing::info!(
                "Loaded {} sprints, {} tasks, {} users from {} (saved by {} at {})",
                envelope.data.sprints.len(),
                envelope.data.tasks.len(),
                envelope.data.users.len(),
                journal.path().display(),
                envelope.metadata.instance_id,
                envelope.metadata.saved_at,
            );
            envelope.data
        } else {
            tracing::info!(
                "No data file at {}, starting empty",
                journal.path().display()
            );
            BoardData::default()
        };
        Ok(TableStore::with_journal(data, journal))
    }
}
