//! Note Sharing Service Library
//!
//! This library crate defines the core modules that make up the note service.
//! It serves as the foundation for the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! The system is composed of four loosely coupled subsystems:
//!
//! - **`storage`**: The persistence layer. A single `Storage` contract with two
//!   interchangeable backends: local disk (one file per note) and S3 (one object
//!   per note). Both agree on read-miss, overwrite, and delete semantics.
//! - **`note`**: The domain layer. Note identifier generation/validation and the
//!   operation pipeline (validate, read/write/delete, respond) that performs at
//!   most one storage call per request.
//! - **`http`**: The transport-independent request layer. Normalizes heterogeneous
//!   inbound requests (JSON, form, raw body, query or path ids) into one canonical
//!   shape and encodes responses per caller type (browser, script, curl).
//! - **`gateway`**: The event adapter. Converts API gateway event envelopes
//!   (HTTP API v2, REST API v1, console test events) into normalized requests so
//!   the same handlers serve both deployment modes.

pub mod gateway;
pub mod http;
pub mod note;
pub mod storage;
