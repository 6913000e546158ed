use std::collections::HashMap;

use anyhow::{Context, Result};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, header};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use serde_json::{Value, json};

use crate::gateway::types::{GatewayResponse, HttpApiEvent, RestApiEvent};
use crate::http::handlers::{AppState, HttpResponse, dispatch};
use crate::http::request::InboundRequest;

/// Answers one gateway event. Detects the envelope format, adapts it to an
/// `InboundRequest`, runs it through the shared dispatch path, and re-wraps
/// the result as a gateway response value.
pub async fn handle_event(state: &AppState, payload: Value) -> Value {
    // HTTP API v2 first: recognized by requestContext.http.method.
    if let Ok(event) = serde_json::from_value::<HttpApiEvent>(payload.clone()) {
        if !event.request_context.http.method.is_empty() {
            tracing::info!(
                "Gateway event: HTTP API v2, {} {}",
                event.request_context.http.method,
                event.raw_path
            );
            return answer(state, inbound_from_http_api(event)).await;
        }
    }

    // REST API v1 next: recognized by httpMethod.
    if let Ok(event) = serde_json::from_value::<RestApiEvent>(payload.clone()) {
        if !event.http_method.is_empty() {
            tracing::info!("Gateway event: REST API v1, {} {}", event.http_method, event.path);
            return answer(state, inbound_from_rest_api(event)).await;
        }
    }

    // Console test events carry neither gateway marker; answer them as GET /.
    if let Some(map) = payload.as_object() {
        if !map.is_empty()
            && !map.contains_key("requestContext")
            && !map.contains_key("httpMethod")
            && !map.contains_key("rawPath")
        {
            tracing::info!("Console test event detected, answering as GET /");
            return answer(state, Ok(console_test_inbound())).await;
        }
    }

    tracing::error!("Unsupported event format: {}", payload);
    error_response(
        400,
        "Unsupported event format. Expected an API Gateway REST API v1 event, \
         HTTP API v2 event, or a console test event.",
    )
}

async fn answer(state: &AppState, inbound: Result<InboundRequest>) -> Value {
    match inbound {
        Ok(request) => to_gateway_value(dispatch(state, &request).await),
        Err(err) => {
            tracing::error!("Failed to adapt gateway event: {:#}", err);
            error_response(500, "Internal server error")
        }
    }
}

/// Maps an HTTP API v2 event onto the normalized request shape.
pub fn inbound_from_http_api(event: HttpApiEvent) -> Result<InboundRequest> {
    let method = parse_method(&event.request_context.http.method)?;
    let path = if event.raw_path.is_empty() {
        "/".to_string()
    } else {
        event.raw_path
    };
    let body = event_body(event.body.unwrap_or_default(), event.is_base64_encoded)?;

    let mut headers = header_map(&event.headers);
    let user_agent = event.request_context.http.user_agent;
    if !headers.contains_key(header::USER_AGENT) && !user_agent.is_empty() {
        if let Ok(value) = HeaderValue::from_str(&user_agent) {
            headers.insert(header::USER_AGENT, value);
        }
    }

    Ok(InboundRequest {
        method,
        path,
        query: event.raw_query_string,
        headers,
        body,
        remote_addr: event.request_context.http.source_ip,
    })
}

/// Maps a REST API v1 proxy event onto the normalized request shape. The
/// query string is reassembled from the parameter map.
pub fn inbound_from_rest_api(event: RestApiEvent) -> Result<InboundRequest> {
    let method = parse_method(&event.http_method)?;
    let path = if event.path.is_empty() {
        "/".to_string()
    } else {
        event.path
    };

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, value) in event.query_string_parameters.iter().flatten() {
        serializer.append_pair(name, value);
    }
    let query = serializer.finish();

    let body = event_body(event.body.unwrap_or_default(), event.is_base64_encoded)?;

    Ok(InboundRequest {
        method,
        path,
        query,
        headers: header_map(&event.headers.unwrap_or_default()),
        body,
        remote_addr: String::new(),
    })
}

fn parse_method(method: &str) -> Result<Method> {
    if method.is_empty() {
        return Ok(Method::GET);
    }
    Method::from_bytes(method.as_bytes())
        .with_context(|| format!("invalid HTTP method in event: {}", method))
}

fn event_body(body: String, is_base64_encoded: bool) -> Result<Bytes> {
    if body.is_empty() {
        return Ok(Bytes::new());
    }
    if is_base64_encoded {
        let decoded = BASE64
            .decode(body.as_bytes())
            .context("failed to decode base64 event body")?;
        return Ok(Bytes::from(decoded));
    }
    Ok(Bytes::from(body))
}

fn header_map(headers: &HashMap<String, String>) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            map.insert(name, value);
        }
    }
    map
}

fn console_test_inbound() -> InboundRequest {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(header::USER_AGENT, HeaderValue::from_static("AWS-Lambda-Test"));
    InboundRequest {
        method: Method::GET,
        path: "/".to_string(),
        query: String::new(),
        headers,
        body: Bytes::new(),
        remote_addr: "127.0.0.1".to_string(),
    }
}

/// Flattens an internal response into the gateway envelope. Multi-valued
/// headers collapse to their first value, matching the single-valued
/// `headers` map both gateway formats share.
fn to_gateway_value(response: HttpResponse) -> Value {
    let mut headers = HashMap::new();
    for (name, value) in response.headers.iter() {
        if let Ok(value) = value.to_str() {
            headers
                .entry(name.as_str().to_string())
                .or_insert_with(|| value.to_string());
        }
    }

    let gateway = GatewayResponse {
        status_code: response.status.as_u16(),
        headers,
        body: String::from_utf8_lossy(&response.body).into_owned(),
    };
    serde_json::to_value(gateway).unwrap_or_else(|_| json!({ "statusCode": 500 }))
}

fn error_response(status_code: u16, message: &str) -> Value {
    json!({
        "statusCode": status_code,
        "headers": { "content-type": "application/json" },
        "body": json!({ "error": message }).to_string(),
    })
}
