//! HTTP Request Layer
//!
//! Normalizes heterogeneous inbound requests into one canonical shape and
//! encodes responses per caller type.
//!
//! ## Core Concepts
//! - **Normalization**: direct HTTP requests and gateway events both become an
//!   `InboundRequest` (method, path, query, headers, body), so the handlers are
//!   deployment-agnostic.
//! - **Id extraction**: explicit query parameter, then body-embedded id, then
//!   path-embedded id (`/noteid/{id}`), first match wins.
//! - **Response shape**: curl-identified callers get plain text; everything
//!   else gets JSON or the interactive HTML document. A UX branch only, never
//!   an access-control decision.

pub mod handlers;
pub mod page;
pub mod request;

#[cfg(test)]
mod tests;
