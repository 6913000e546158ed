//! Gateway Event Envelopes
//!
//! Serde views of the two API gateway event formats the adapter accepts,
//! reduced to the fields the note service consumes, plus the response
//! envelope both formats share.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// API Gateway HTTP API (v2) event. Fields the gateway serializes as
/// explicit `null` (the body on GET requests) are `Option` so
/// deserialization tolerates them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpApiEvent {
    pub raw_path: String,
    pub raw_query_string: String,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
    pub is_base64_encoded: bool,
    pub request_context: HttpApiRequestContext,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpApiRequestContext {
    pub http: HttpApiDescription,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpApiDescription {
    pub method: String,
    pub path: String,
    pub source_ip: String,
    pub user_agent: String,
}

/// API Gateway REST API (v1) proxy event. On GET requests the gateway sends
/// explicit `null` (not absent fields) for `body`, `queryStringParameters`,
/// and sometimes `headers`, so those are `Option`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RestApiEvent {
    pub http_method: String,
    pub path: String,
    pub query_string_parameters: Option<HashMap<String, String>>,
    pub headers: Option<HashMap<String, String>>,
    pub body: Option<String>,
    pub is_base64_encoded: bool,
}

/// Response envelope; the status/headers/body triple is shared by both
/// gateway formats.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}
