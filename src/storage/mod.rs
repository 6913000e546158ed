//! Note Storage Module
//!
//! Implements the content-addressed key/value contract behind the note service.
//!
//! ## Core Concepts
//! - **Contract**: `Storage` exposes `read`, `write`, `delete` keyed by note id.
//!   A missing key reads back as empty content with no error, and deleting a
//!   missing key succeeds, so both backends are interchangeable.
//! - **Backends**: `LocalStorage` keeps one file per note inside a configured
//!   directory; `S3Storage` keeps one object per note under a configured prefix.
//! - **Errors**: only true I/O faults (permissions, network, service errors)
//!   surface as errors. "Not found" is never an error.

pub mod local;
pub mod s3;


use anyhow::Result;
use async_trait::async_trait;

/// The storage contract shared by all backends.
///
/// Callers must validate note ids before reaching this layer; the id is used
/// verbatim as a file name or object key suffix.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Returns the stored content for `note_id`, or an empty string if the
    /// note does not exist.
    async fn read(&self, note_id: &str) -> Result<String>;

    /// Creates or fully overwrites the note at `note_id`.
    async fn write(&self, note_id: &str, content: &str) -> Result<()>;

    /// Removes the note. Deleting a note that does not exist is not an error.
    async fn delete(&self, note_id: &str) -> Result<()>;
}
