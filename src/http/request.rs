//! Inbound request normalization.
//!
//! Every deployment mode funnels into `InboundRequest`; the extraction helpers
//! here map the three request encodings (JSON body, form body, raw body, with
//! query- or path-embedded ids) onto one canonical `NoteRequest`.

use anyhow::{Result, anyhow};
use axum::http::{HeaderMap, Method, header};
use bytes::Bytes;

use crate::note::types::NoteRequest;

/// Path marker preceding a path-embedded note id, e.g. `/app/noteid/AB3K9`.
const PATH_ID_MARKER: &str = "/noteid/";

/// A transport-independent inbound request. Built from a native axum request
/// or synthesized from a gateway event envelope.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Transport-level peer, `ip:port` or bare ip. Empty if unknown.
    pub remote_addr: String,
}

impl InboundRequest {
    /// Returns the first query parameter named `name`, if present and non-empty.
    pub fn query_param(&self, name: &str) -> Option<String> {
        form_urlencoded::parse(self.query.as_bytes())
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
            .filter(|v| !v.is_empty())
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Note id for reads: `?note=` takes precedence over the path segment.
    pub fn note_id(&self) -> Option<String> {
        self.query_param("note").or_else(|| self.path_note_id())
    }

    /// Extracts a note id embedded in the path after the `/noteid/` marker,
    /// trimmed of surrounding slashes. Works behind reverse-proxy subpaths.
    pub fn path_note_id(&self) -> Option<String> {
        let idx = self.path.find(PATH_ID_MARKER)?;
        let id = self.path[idx + PATH_ID_MARKER.len()..].trim_matches('/');
        (!id.is_empty()).then(|| id.to_string())
    }

    /// True when the caller identifies as curl. Drives the plain-text response
    /// branch; deliberately never used for authorization.
    pub fn is_curl(&self) -> bool {
        self.header(header::USER_AGENT.as_str())
            .map(|ua| ua.to_ascii_lowercase().contains("curl"))
            .unwrap_or(false)
    }

    /// Best-effort client IP for logging. Preference order: `Forwarded` `for=`
    /// token, first `X-Forwarded-For` entry, `X-Real-IP`, then the transport
    /// peer address. Observability only, never authorization.
    pub fn client_ip(&self) -> String {
        if let Some(forwarded) = self.header("forwarded") {
            for part in forwarded.split(';').flat_map(|s| s.split(',')) {
                let part = part.trim();
                if part.len() > 4 && part[..4].eq_ignore_ascii_case("for=") {
                    return strip_host(part[4..].trim().trim_matches('"'));
                }
            }
        }

        if let Some(xff) = self.header("x-forwarded-for") {
            if let Some(first) = xff.split(',').next() {
                let first = first.trim().trim_matches('"');
                if !first.is_empty() {
                    return strip_host(first);
                }
            }
        }

        if let Some(real_ip) = self.header("x-real-ip") {
            let real_ip = real_ip.trim();
            if !real_ip.is_empty() {
                return strip_host(real_ip);
            }
        }

        strip_host(&self.remote_addr)
    }

    /// Application base URL used for shareable links: the `URL` environment
    /// override when set, otherwise reconstructed from forwarding headers,
    /// with any `/noteid/{id}` suffix stripped and a trailing slash ensured.
    pub fn base_url(&self) -> String {
        if let Ok(url) = std::env::var("URL") {
            if !url.is_empty() {
                return if url.ends_with('/') { url } else { format!("{}/", url) };
            }
        }

        let scheme = if self.header("x-forwarded-proto") == Some("https") {
            "https"
        } else {
            "http"
        };
        let host = self
            .header("x-forwarded-host")
            .or_else(|| self.header(header::HOST.as_str()))
            .unwrap_or("localhost");

        let mut path = match self.path.find(PATH_ID_MARKER) {
            Some(idx) => self.path[..idx].to_string(),
            None => self.path.clone(),
        };
        if !path.ends_with('/') {
            path.push('/');
        }
        format!("{}://{}{}", scheme, host, path)
    }
}

/// Strips surrounding brackets and a trailing port from a host candidate.
fn strip_host(value: &str) -> String {
    if let Ok(addr) = value.parse::<std::net::SocketAddr>() {
        return addr.ip().to_string();
    }
    value.trim_start_matches('[').trim_end_matches(']').to_string()
}

/// Parses the body into a `NoteRequest` per the declared content type and
/// returns it together with that content type (which also picks the response
/// shape for form posts).
///
/// - `application/json`: decode `{noteId, content}`; a missing `noteId` falls
///   back to the path-embedded id. Undecodable JSON is the only parse error.
/// - `application/x-www-form-urlencoded`: take `text`/`noteId` fields when
///   present, otherwise treat the whole body as literal content.
/// - anything else: the whole body is literal content; the id comes from the
///   `noteId` query parameter, falling back to the path-embedded id.
pub fn parse_note_request(request: &InboundRequest) -> Result<(NoteRequest, String)> {
    let content_type = request
        .header(header::CONTENT_TYPE.as_str())
        .unwrap_or("")
        .to_string();

    if content_type.contains("application/json") {
        let mut req: NoteRequest = serde_json::from_slice(&request.body)
            .map_err(|_| anyhow!("Invalid JSON format"))?;
        if req.note_id.is_empty() {
            req.note_id = request.path_note_id().unwrap_or_default();
        }
        return Ok((req, content_type));
    }

    if content_type.contains("application/x-www-form-urlencoded") {
        let fields: Vec<(String, String)> = form_urlencoded::parse(&request.body)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let has_known_field = fields.iter().any(|(k, _)| k == "text" || k == "noteId");
        if has_known_field {
            let field = |name: &str| {
                fields
                    .iter()
                    .find(|(k, _)| k == name)
                    .map(|(_, v)| v.clone())
                    .unwrap_or_default()
            };
            let req = NoteRequest {
                note_id: field("noteId"),
                content: field("text"),
            };
            tracing::info!(
                "Parsed form data: noteId={}, content_length={}",
                req.note_id,
                req.content.len()
            );
            return Ok((req, content_type));
        }
        // Tolerate malformed or non-form bodies sent with this content type.
        tracing::info!("Received {} bytes of raw form body", request.body.len());
        let req = NoteRequest {
            note_id: String::new(),
            content: String::from_utf8_lossy(&request.body).into_owned(),
        };
        return Ok((req, content_type));
    }

    // Plain text or piped binary data.
    let note_id = request
        .query_param("noteId")
        .or_else(|| request.path_note_id())
        .unwrap_or_default();
    tracing::info!("Received {} bytes of raw request body", request.body.len());
    let req = NoteRequest {
        note_id,
        content: String::from_utf8_lossy(&request.body).into_owned(),
    };
    Ok((req, content_type))
}
