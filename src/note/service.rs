//! Note Operation Pipeline
//!
//! Orchestrates validate -> read/write/delete against the injected storage
//! backend. Each request performs exactly one storage call and no retries;
//! transient failures surface immediately to the caller.

use std::sync::Arc;

use thiserror::Error;

use crate::note::id;
use crate::storage::Storage;

/// Errors the pipeline can surface. Validation failures never touch storage.
#[derive(Debug, Error)]
pub enum NoteError {
    #[error("Invalid note ID format")]
    InvalidId,
    #[error("storage operation failed")]
    Storage(#[from] anyhow::Error),
}

/// Outcome of a save request: either the note was written or, because the
/// content was empty, deleted.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved { note_id: String },
    Deleted { note_id: String },
}

impl SaveOutcome {
    pub fn note_id(&self) -> &str {
        match self {
            SaveOutcome::Saved { note_id } | SaveOutcome::Deleted { note_id } => note_id,
        }
    }
}

/// Stateless per-request note operations over an injected storage backend.
///
/// The service holds no note state between requests, so HTTP-server and
/// gateway deployments can run the same pipeline without shared memory.
#[derive(Clone)]
pub struct NoteService {
    storage: Arc<dyn Storage>,
}

impl NoteService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Reads a note. An empty result is ambiguous between "never existed" and
    /// "written empty and not deleted"; both present as an empty note.
    pub async fn read(&self, note_id: &str) -> Result<String, NoteError> {
        if !id::validate(note_id) {
            return Err(NoteError::InvalidId);
        }
        Ok(self.storage.read(note_id).await?)
    }

    /// Saves or deletes a note depending on content.
    ///
    /// An empty `requested_id` gets a freshly generated id. Whitespace-only
    /// content deletes the note instead of writing it; this is load-bearing
    /// behavior (clearing the editor removes the note), not an edge case.
    pub async fn save(&self, requested_id: &str, content: &str) -> Result<SaveOutcome, NoteError> {
        let note_id = requested_id.trim();
        let note_id = if note_id.is_empty() {
            let generated = id::generate();
            tracing::info!("Generated new note ID: {}", generated);
            generated
        } else {
            tracing::info!("Using provided note ID: {}", note_id);
            note_id.to_string()
        };

        if !id::validate(&note_id) {
            tracing::error!("Invalid note ID format: {}", note_id);
            return Err(NoteError::InvalidId);
        }

        if content.trim().is_empty() {
            self.storage.delete(&note_id).await?;
            tracing::info!("Note {} deleted", note_id);
            Ok(SaveOutcome::Deleted { note_id })
        } else {
            self.storage.write(&note_id, content).await?;
            tracing::info!("Note {} saved ({} bytes)", note_id, content.len());
            Ok(SaveOutcome::Saved { note_id })
        }
    }
}
