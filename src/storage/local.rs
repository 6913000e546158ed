use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::Storage;

/// Disk-backed storage: one file per note, named exactly as the note id,
/// inside a configured root directory.
pub struct LocalStorage {
    dir: PathBuf,
}

impl LocalStorage {
    /// Creates the storage root directory if it does not exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).with_context(|| {
            format!("failed to create notes directory {}", dir.display())
        })?;
        tracing::info!("LocalStorage initialized at: {}", dir.display());
        Ok(Self { dir })
    }

    fn note_path(&self, note_id: &str) -> PathBuf {
        self.dir.join(note_id)
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn read(&self, note_id: &str) -> Result<String> {
        let path = self.note_path(note_id);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                tracing::debug!(
                    "Note {} read from {} ({} bytes)",
                    note_id,
                    path.display(),
                    content.len()
                );
                Ok(content)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::info!("Note {} does not exist at {}", note_id, path.display());
                Ok(String::new())
            }
            Err(err) => {
                tracing::error!("Failed to read note {} from {}: {}", note_id, path.display(), err);
                Err(err).with_context(|| format!("failed to read note {}", note_id))
            }
        }
    }

    async fn write(&self, note_id: &str, content: &str) -> Result<()> {
        let path = self.note_path(note_id);
        if let Err(err) = tokio::fs::write(&path, content).await {
            tracing::error!("Failed to write note {} to {}: {}", note_id, path.display(), err);
            return Err(err).with_context(|| format!("failed to write note {}", note_id));
        }
        tracing::debug!(
            "Note {} written to {} ({} bytes)",
            note_id,
            path.display(),
            content.len()
        );
        Ok(())
    }

    async fn delete(&self, note_id: &str) -> Result<()> {
        let path = self.note_path(note_id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!("Note {} deleted from {}", note_id, path.display());
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::info!("Note {} already absent at {}, nothing to delete", note_id, path.display());
                Ok(())
            }
            Err(err) => {
                tracing::error!("Failed to delete note {} from {}: {}", note_id, path.display(), err);
                Err(err).with_context(|| format!("failed to delete note {}", note_id))
            }
        }
    }
}
