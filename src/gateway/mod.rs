//! Gateway Event Adapter Module
//!
//! Converts API gateway event envelopes into normalized requests and back.
//!
//! ## Core Concepts
//! - **Detection**: HTTP API v2 envelopes are recognized by
//!   `requestContext.http.method`, REST API v1 envelopes by `httpMethod`,
//!   and bare console test events by the absence of both.
//! - **Adaptation**: pure data transformation, envelope field -> request
//!   field, with base64 body decoding. No behavior lives here; events are
//!   answered by the same dispatch path as native HTTP requests.

pub mod adapter;
pub mod types;
