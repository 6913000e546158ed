use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::{ConnectInfo, Extension};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::http::page;
use crate::http::request::{InboundRequest, parse_note_request};
use crate::note::service::{NoteError, NoteService};
use crate::note::types::NoteResponse;

const FAVICON: &[u8] = include_bytes!("../../assets/favicon.ico");

/// Shared per-process state: the note pipeline over the configured backend.
pub struct AppState {
    pub notes: NoteService,
}

impl AppState {
    pub fn new(notes: NoteService) -> Self {
        Self { notes }
    }
}

/// Transport-independent response, convertible to an axum response or a
/// gateway response envelope.
#[derive(Debug)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

fn text_response(status: StatusCode, body: impl Into<String>) -> HttpResponse {
    let mut response = HttpResponse::new(status);
    response.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response.body = Bytes::from(body.into());
    response
}

fn html_response(body: String) -> HttpResponse {
    let mut response = HttpResponse::new(StatusCode::OK);
    response.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    response.body = Bytes::from(body);
    response
}

fn json_response(status: StatusCode, payload: &NoteResponse) -> HttpResponse {
    let mut response = HttpResponse::new(status);
    response.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response.body = Bytes::from(serde_json::to_vec(payload).unwrap_or_default());
    response
}

fn with_cors(mut response: HttpResponse) -> HttpResponse {
    response.headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response.headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    response.headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

/// Routes a normalized request to the matching handler. Both the HTTP server
/// and the gateway adapter enter here, so behavior is identical across
/// deployment modes.
pub async fn dispatch(state: &AppState, request: &InboundRequest) -> HttpResponse {
    if request.path.ends_with("/favicon.ico") {
        return handle_favicon(request);
    }
    if request.method == Method::GET {
        handle_get(state, request).await
    } else if request.method == Method::POST || request.method == Method::OPTIONS {
        handle_post(state, request).await
    } else {
        text_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed\n")
    }
}

async fn handle_get(state: &AppState, request: &InboundRequest) -> HttpResponse {
    let note_id = request.note_id();
    let client_ip = request.client_ip();

    match &note_id {
        Some(id) => tracing::info!("[GET] Retrieving note: {} from {}", id, client_ip),
        None => {
            // Local health checks are not interesting.
            if client_ip != "127.0.0.1" && client_ip != "::1" {
                tracing::info!("[GET] Creating new note from {}", client_ip);
            }
        }
    }

    let mut content = String::new();
    if let Some(id) = &note_id {
        match state.notes.read(id).await {
            Ok(stored) => content = stored,
            Err(NoteError::InvalidId) => {
                tracing::error!("[GET] Invalid note ID format: {}", id);
                return text_response(StatusCode::BAD_REQUEST, "Invalid note ID format\n");
            }
            Err(NoteError::Storage(err)) => {
                tracing::error!("[GET] Failed to read note {}: {:#}", id, err);
                return text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error\n");
            }
        }
    }

    // Terminal clients asking for a specific note get the bare content.
    if request.is_curl() && note_id.is_some() {
        if content.is_empty() {
            return text_response(StatusCode::NOT_FOUND, "Note not found\n");
        }
        return text_response(StatusCode::OK, content);
    }

    html_response(page::render(note_id.as_deref().unwrap_or(""), &content))
}

async fn handle_post(state: &AppState, request: &InboundRequest) -> HttpResponse {
    let client_ip = request.client_ip();

    if request.method == Method::OPTIONS {
        tracing::info!("[POST] Preflight OPTIONS request from {}", client_ip);
        return with_cors(HttpResponse::new(StatusCode::OK));
    }
    tracing::info!("[POST] Request from {}", client_ip);

    let (note_request, content_type) = match parse_note_request(request) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::error!("[POST] Failed to parse request from {}: {}", client_ip, err);
            return with_cors(json_response(
                StatusCode::BAD_REQUEST,
                &NoteResponse::error(err.to_string()),
            ));
        }
    };

    let deleting = note_request.content.trim().is_empty();
    let outcome = match state
        .notes
        .save(&note_request.note_id, &note_request.content)
        .await
    {
        Ok(outcome) => outcome,
        Err(NoteError::InvalidId) => {
            return with_cors(json_response(
                StatusCode::BAD_REQUEST,
                &NoteResponse::error("Invalid note ID format"),
            ));
        }
        Err(NoteError::Storage(err)) => {
            let message = if deleting {
                "Failed to delete note"
            } else {
                "Failed to save note"
            };
            tracing::error!("[POST] {} (client {}): {:#}", message, client_ip, err);
            return with_cors(json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &NoteResponse::error(message),
            ));
        }
    };

    let note_id = outcome.note_id();
    if request.is_curl() {
        let share_url = format!("{}noteid/{}\n", request.base_url(), note_id);
        return with_cors(text_response(StatusCode::OK, share_url));
    }
    if content_type.contains("application/x-www-form-urlencoded") {
        return with_cors(text_response(StatusCode::OK, format!("OK: {}\n", note_id)));
    }
    with_cors(json_response(StatusCode::OK, &NoteResponse::ok(note_id)))
}

fn handle_favicon(request: &InboundRequest) -> HttpResponse {
    if request.method != Method::GET && request.method != Method::HEAD {
        return text_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed\n");
    }
    let mut response = HttpResponse::new(StatusCode::OK);
    response.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("image/x-icon"),
    );
    if request.method == Method::GET {
        response.body = Bytes::from_static(FAVICON);
    }
    response
}

/// Builds the axum application. A single fallback route funnels every path
/// through `dispatch`, mirroring how gateway events arrive.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new().fallback(handle_any).layer(Extension(state))
}

async fn handle_any(
    Extension(state): Extension<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: axum::extract::Request,
) -> Response {
    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!("Failed to read request body: {}", err);
            return text_response(StatusCode::INTERNAL_SERVER_ERROR, "Read error\n")
                .into_response();
        }
    };

    let inbound = InboundRequest {
        method: parts.method,
        path: parts.uri.path().to_string(),
        query: parts.uri.query().unwrap_or("").to_string(),
        headers: parts.headers,
        body,
        remote_addr: peer.to_string(),
    };

    dispatch(&state, &inbound).await.into_response()
}
