//! Note Wire Types
//!
//! Data Transfer Objects shared by the JSON API, the form/raw request
//! normalizer, and the gateway adapter.

use serde::{Deserialize, Serialize};

/// The canonical `(noteID, content)` pair every inbound write normalizes to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteRequest {
    /// Requested note id. Empty means "generate one".
    #[serde(rename = "noteId", default)]
    pub note_id: String,
    /// Full note content. Empty (after trimming) means "delete the note".
    #[serde(default)]
    pub content: String,
}

/// JSON response for write operations and errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteResponse {
    pub success: bool,
    /// The id the note was stored (or deleted) under.
    #[serde(rename = "noteId", default, skip_serializing_if = "Option::is_none")]
    pub note_id: Option<String>,
    /// Caller-safe error message; backend error detail stays in the logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NoteResponse {
    pub fn ok(note_id: impl Into<String>) -> Self {
        Self {
            success: true,
            note_id: Some(note_id.into()),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            note_id: None,
            error: Some(message.into()),
        }
    }
}
