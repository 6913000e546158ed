//! Note Domain Module
//!
//! Implements the note identifier codec and the per-request operation pipeline.
//!
//! ## Core Concepts
//! - **Identifiers**: short alphanumeric ids. Validation is a security boundary:
//!   ids double as file names and object key suffixes, so anything outside
//!   `[A-Za-z0-9]` is rejected before storage is touched.
//! - **Pipeline**: `NoteService` orchestrates validate, then exactly one storage
//!   call (read, write, or delete), with auto-generation of missing ids and
//!   delete-on-empty-content semantics.

pub mod id;
pub mod service;
pub mod types;
