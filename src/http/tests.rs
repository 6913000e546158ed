//! HTTP Layer Tests
//!
//! Validates request normalization and handler behavior end to end against an
//! in-memory storage backend, without binding a socket.
//!
//! ## Test Scopes
//! - **Normalizer**: id extraction precedence, content-type branching,
//!   client-IP preference order, curl detection.
//! - **Handlers**: GET/POST/OPTIONS/favicon status codes, response shapes per
//!   caller type, and the save/retrieve/delete scenario.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
    use bytes::Bytes;

    use crate::http::handlers::{AppState, dispatch};
    use crate::http::page::escape_html;
    use crate::http::request::{InboundRequest, parse_note_request};
    use crate::note::service::NoteService;
    use crate::note::types::NoteResponse;
    use crate::storage::Storage;

    struct MockStorage {
        data: Mutex<HashMap<String, String>>,
    }

    impl MockStorage {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                data: Mutex::new(HashMap::new()),
            })
        }
    }

    #[async_trait]
    impl Storage for MockStorage {
        async fn read(&self, note_id: &str) -> Result<String> {
            Ok(self.data.lock().unwrap().get(note_id).cloned().unwrap_or_default())
        }

        async fn write(&self, note_id: &str, content: &str) -> Result<()> {
            self.data.lock().unwrap().insert(note_id.to_string(), content.to_string());
            Ok(())
        }

        async fn delete(&self, note_id: &str) -> Result<()> {
            self.data.lock().unwrap().remove(note_id);
            Ok(())
        }
    }

    /// Storage whose every operation fails, for 500-path tests.
    struct BrokenStorage;

    #[async_trait]
    impl Storage for BrokenStorage {
        async fn read(&self, _note_id: &str) -> Result<String> {
            Err(anyhow!("disk on fire"))
        }

        async fn write(&self, _note_id: &str, _content: &str) -> Result<()> {
            Err(anyhow!("disk on fire"))
        }

        async fn delete(&self, _note_id: &str) -> Result<()> {
            Err(anyhow!("disk on fire"))
        }
    }

    fn state_with(storage: Arc<dyn Storage>) -> AppState {
        AppState::new(NoteService::new(storage))
    }

    fn request(method: Method, uri: &str) -> InboundRequest {
        let (path, query) = match uri.split_once('?') {
            Some((p, q)) => (p.to_string(), q.to_string()),
            None => (uri.to_string(), String::new()),
        };
        InboundRequest {
            method,
            path,
            query,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            remote_addr: "192.0.2.7:41234".to_string(),
        }
    }

    fn with_header(mut req: InboundRequest, name: &'static str, value: &str) -> InboundRequest {
        req.headers.insert(name, HeaderValue::from_str(value).unwrap());
        req
    }

    fn with_body(mut req: InboundRequest, body: &str) -> InboundRequest {
        req.body = Bytes::from(body.to_string());
        req
    }

    fn json_post(uri: &str, body: &str) -> InboundRequest {
        with_body(
            with_header(request(Method::POST, uri), "content-type", "application/json"),
            body,
        )
    }

    fn decode(response: &crate::http::handlers::HttpResponse) -> NoteResponse {
        serde_json::from_slice(&response.body).expect("JSON response body")
    }

    fn body_text(response: &crate::http::handlers::HttpResponse) -> String {
        String::from_utf8_lossy(&response.body).into_owned()
    }

    // ============================================================
    // ID EXTRACTION AND NORMALIZATION
    // ============================================================

    #[test]
    fn test_path_note_id_extraction() {
        let req = request(Method::GET, "/noteid/ABC123");
        assert_eq!(req.path_note_id().as_deref(), Some("ABC123"));

        let req = request(Method::GET, "/app/noteid/XYZ/");
        assert_eq!(req.path_note_id().as_deref(), Some("XYZ"));

        let req = request(Method::GET, "/");
        assert_eq!(req.path_note_id(), None);
    }

    #[test]
    fn test_note_id_prefers_query_over_path() {
        let req = request(Method::GET, "/noteid/SHOULDNOT?note=Q123");
        assert_eq!(req.note_id().as_deref(), Some("Q123"));
    }

    #[test]
    fn test_empty_query_note_falls_back_to_path() {
        let req = request(Method::GET, "/noteid/P1?note=");
        assert_eq!(req.note_id().as_deref(), Some("P1"));
    }

    #[test]
    fn test_parse_json_body_with_path_fallback() {
        let req = json_post("/noteid/PATHID", r#"{"content":"hello"}"#);
        let (parsed, _) = parse_note_request(&req).unwrap();
        assert_eq!(parsed.note_id, "PATHID");
        assert_eq!(parsed.content, "hello");
    }

    #[test]
    fn test_parse_json_body_id_wins_over_path() {
        let req = json_post("/noteid/PATHID", r#"{"noteId":"BODYID","content":"x"}"#);
        let (parsed, _) = parse_note_request(&req).unwrap();
        assert_eq!(parsed.note_id, "BODYID");
    }

    #[test]
    fn test_parse_malformed_json_is_an_error() {
        let req = json_post("/", "{not json");
        assert!(parse_note_request(&req).is_err());
    }

    #[test]
    fn test_parse_form_body() {
        let req = with_body(
            with_header(
                request(Method::POST, "/"),
                "content-type",
                "application/x-www-form-urlencoded",
            ),
            "text=hi&noteId=X1",
        );
        let (parsed, content_type) = parse_note_request(&req).unwrap();
        assert_eq!(parsed.note_id, "X1");
        assert_eq!(parsed.content, "hi");
        assert!(content_type.contains("x-www-form-urlencoded"));
    }

    #[test]
    fn test_parse_form_body_without_known_fields_is_raw() {
        let req = with_body(
            with_header(
                request(Method::POST, "/"),
                "content-type",
                "application/x-www-form-urlencoded",
            ),
            "just some pasted text",
        );
        let (parsed, _) = parse_note_request(&req).unwrap();
        assert_eq!(parsed.note_id, "");
        assert_eq!(parsed.content, "just some pasted text");
    }

    #[test]
    fn test_parse_raw_body_takes_path_id() {
        let req = with_body(
            with_header(request(Method::POST, "/noteid/RAWID"), "content-type", "text/plain"),
            "raw body",
        );
        let (parsed, _) = parse_note_request(&req).unwrap();
        assert_eq!(parsed.note_id, "RAWID");
        assert_eq!(parsed.content, "raw body");
    }

    #[test]
    fn test_parse_raw_body_prefers_query_id() {
        let req = with_body(request(Method::POST, "/noteid/PATHID?noteId=QUERYID"), "payload");
        let (parsed, _) = parse_note_request(&req).unwrap();
        assert_eq!(parsed.note_id, "QUERYID");
        assert_eq!(parsed.content, "payload");
    }

    // ============================================================
    // CLIENT IP AND CALLER DETECTION
    // ============================================================

    #[test]
    fn test_client_ip_prefers_forwarded_header() {
        let req = with_header(
            with_header(request(Method::GET, "/"), "forwarded", "for=203.0.113.60;proto=https"),
            "x-forwarded-for",
            "198.51.100.1",
        );
        assert_eq!(req.client_ip(), "203.0.113.60");
    }

    #[test]
    fn test_client_ip_takes_first_x_forwarded_for_entry() {
        let req = with_header(
            request(Method::GET, "/"),
            "x-forwarded-for",
            "198.51.100.1, 10.0.0.1",
        );
        assert_eq!(req.client_ip(), "198.51.100.1");
    }

    #[test]
    fn test_client_ip_strips_port_and_brackets() {
        let req = with_header(request(Method::GET, "/"), "x-real-ip", "[2001:db8::1]:443");
        assert_eq!(req.client_ip(), "2001:db8::1");
    }

    #[test]
    fn test_client_ip_falls_back_to_peer() {
        let req = request(Method::GET, "/");
        assert_eq!(req.client_ip(), "192.0.2.7");
    }

    #[test]
    fn test_curl_detection_is_case_insensitive_substring() {
        let req = with_header(request(Method::GET, "/"), "user-agent", "cURL/8.5.0");
        assert!(req.is_curl());

        let req = with_header(request(Method::GET, "/"), "user-agent", "Mozilla/5.0");
        assert!(!req.is_curl());

        assert!(!request(Method::GET, "/").is_curl());
    }

    // ============================================================
    // GET HANDLER
    // ============================================================

    #[tokio::test]
    async fn test_get_without_id_renders_empty_editor() {
        let state = state_with(MockStorage::new());
        let response = dispatch(&state, &request(Method::GET, "/?note=")).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.headers.get("content-type").unwrap(),
            "text/html; charset=utf-8"
        );
        assert!(body_text(&response).contains("<textarea"));
    }

    #[tokio::test]
    async fn test_get_existing_note_embeds_content() {
        let storage = MockStorage::new();
        storage.write("test123", "test content").await.unwrap();
        let state = state_with(storage);

        let response = dispatch(&state, &request(Method::GET, "/?note=test123")).await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(body_text(&response).contains("test content"));
    }

    #[tokio::test]
    async fn test_get_escapes_note_content_in_html() {
        let storage = MockStorage::new();
        storage
            .write("xss11", "<script>alert('x')</script>")
            .await
            .unwrap();
        let state = state_with(storage);

        let response = dispatch(&state, &request(Method::GET, "/?note=xss11")).await;
        let body = body_text(&response);
        assert!(!body.contains("<script>alert"));
        assert!(body.contains("&lt;script&gt;"));
    }

    #[tokio::test]
    async fn test_get_curl_returns_raw_text() {
        let storage = MockStorage::new();
        storage.write("curl1", "raw note body").await.unwrap();
        let state = state_with(storage);

        let req = with_header(request(Method::GET, "/?note=curl1"), "user-agent", "curl/8.5.0");
        let response = dispatch(&state, &req).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.headers.get("content-type").unwrap(),
            "text/plain; charset=utf-8"
        );
        assert_eq!(body_text(&response), "raw note body");
    }

    #[tokio::test]
    async fn test_get_curl_missing_note_is_404() {
        let state = state_with(MockStorage::new());
        let req = with_header(request(Method::GET, "/?note=nope1"), "user-agent", "curl/8.5.0");
        let response = dispatch(&state, &req).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_invalid_id_is_rejected_before_storage() {
        let state = state_with(Arc::new(BrokenStorage));
        let req = request(Method::GET, "/?note=..%2F..%2Fetc%2Fpasswd");
        let response = dispatch(&state, &req).await;
        // BrokenStorage would 500; a 400 proves storage was never reached.
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_storage_failure_is_500() {
        let state = state_with(Arc::new(BrokenStorage));
        let response = dispatch(&state, &request(Method::GET, "/?note=abc12")).await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body_text(&response).contains("disk on fire"), "backend detail must not leak");
    }

    // ============================================================
    // POST HANDLER
    // ============================================================

    #[tokio::test]
    async fn test_post_new_note_generates_id() {
        let storage = MockStorage::new();
        let state = state_with(storage.clone());

        let response = dispatch(
            &state,
            &json_post("/", r#"{"noteId":"","content":"test content"}"#),
        )
        .await;
        assert_eq!(response.status, StatusCode::OK);

        let decoded = decode(&response);
        assert!(decoded.success);
        let note_id = decoded.note_id.expect("generated note id");
        assert_eq!(note_id.len(), 5);
        assert_eq!(storage.read(&note_id).await.unwrap(), "test content");
    }

    #[tokio::test]
    async fn test_post_updates_existing_note() {
        let storage = MockStorage::new();
        storage.write("test123", "original").await.unwrap();
        let state = state_with(storage.clone());

        let response = dispatch(
            &state,
            &json_post("/", r#"{"noteId":"test123","content":"updated content"}"#),
        )
        .await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(decode(&response).success);
        assert_eq!(storage.read("test123").await.unwrap(), "updated content");
    }

    #[tokio::test]
    async fn test_post_invalid_id_is_400() {
        let state = state_with(MockStorage::new());
        let response = dispatch(
            &state,
            &json_post("/", r#"{"noteId":"invalid@id","content":"x"}"#),
        )
        .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);

        let decoded = decode(&response);
        assert!(!decoded.success);
        assert!(decoded.error.is_some());
    }

    #[tokio::test]
    async fn test_post_malformed_json_is_400() {
        let state = state_with(MockStorage::new());
        let response = dispatch(&state, &json_post("/", "{oops")).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_post_empty_content_deletes_note() {
        let storage = MockStorage::new();
        storage.write("test123", "original content").await.unwrap();
        let state = state_with(storage.clone());

        let response = dispatch(
            &state,
            &json_post("/", r#"{"noteId":"test123","content":""}"#),
        )
        .await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(decode(&response).success);
        assert_eq!(storage.read("test123").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_post_storage_failure_is_500_with_generic_error() {
        let state = state_with(Arc::new(BrokenStorage));
        let response = dispatch(
            &state,
            &json_post("/", r#"{"noteId":"abc12","content":"x"}"#),
        )
        .await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);

        let decoded = decode(&response);
        assert_eq!(decoded.error.as_deref(), Some("Failed to save note"));
    }

    #[tokio::test]
    async fn test_post_form_body_gets_plain_ok_line() {
        let storage = MockStorage::new();
        let state = state_with(storage.clone());

        let req = with_body(
            with_header(
                request(Method::POST, "/"),
                "content-type",
                "application/x-www-form-urlencoded",
            ),
            "text=hi&noteId=X1",
        );
        let response = dispatch(&state, &req).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(body_text(&response), "OK: X1\n");
        assert_eq!(storage.read("X1").await.unwrap(), "hi");
    }

    #[tokio::test]
    async fn test_post_curl_gets_shareable_url() {
        let state = state_with(MockStorage::new());
        let req = with_header(
            with_header(
                with_body(request(Method::POST, "/noteid/AB3K9"), "piped content"),
                "user-agent",
                "curl/8.5.0",
            ),
            "host",
            "notes.example.com",
        );
        let response = dispatch(&state, &req).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(body_text(&response), "http://notes.example.com/noteid/AB3K9\n");
    }

    #[tokio::test]
    async fn test_options_preflight_gets_cors_headers_and_no_body() {
        let state = state_with(MockStorage::new());
        let response = dispatch(&state, &request(Method::OPTIONS, "/")).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.headers.get("access-control-allow-origin").unwrap(),
            "*"
        );
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_retrieve_then_delete_scenario() {
        let state = state_with(MockStorage::new());

        // Create with generated id.
        let response = dispatch(
            &state,
            &json_post("/", r#"{"noteId":"","content":"hello"}"#),
        )
        .await;
        let note_id = decode(&response).note_id.unwrap();

        // Retrieve as curl: bare content.
        let get = with_header(
            request(Method::GET, &format!("/?note={}", note_id)),
            "user-agent",
            "curl/8.5.0",
        );
        let response = dispatch(&state, &get).await;
        assert_eq!(body_text(&response), "hello");

        // Empty-content write deletes.
        let body = format!(r#"{{"noteId":"{}","content":""}}"#, note_id);
        let response = dispatch(&state, &json_post("/", &body)).await;
        assert!(decode(&response).success);

        // Gone: curl now sees 404.
        let get = with_header(
            request(Method::GET, &format!("/?note={}", note_id)),
            "user-agent",
            "curl/8.5.0",
        );
        let response = dispatch(&state, &get).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    // ============================================================
    // ROUTING EDGES
    // ============================================================

    #[tokio::test]
    async fn test_unsupported_method_is_405() {
        let state = state_with(MockStorage::new());
        let response = dispatch(&state, &request(Method::PUT, "/")).await;
        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_favicon_get_and_head_only() {
        let state = state_with(MockStorage::new());

        let response = dispatch(&state, &request(Method::GET, "/favicon.ico")).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.headers.get("content-type").unwrap(), "image/x-icon");
        assert!(!response.body.is_empty());

        let response = dispatch(&state, &request(Method::HEAD, "/favicon.ico")).await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body.is_empty());

        let response = dispatch(&state, &request(Method::POST, "/favicon.ico")).await;
        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<script>alert('xss')</script>"),
            "&lt;script&gt;alert(&#39;xss&#39;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("test & test"), "test &amp; test");
        assert_eq!(escape_html("\"quoted\""), "&quot;quoted&quot;");
        assert_eq!(escape_html("normal text"), "normal text");
        assert_eq!(escape_html(""), "");
    }
}
