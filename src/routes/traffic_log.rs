//! Request/response logging middleware.
//!
//! Emits one structured JSON line per inbound request and one per outbound
//! response, tagged with a shared `request_id`. Bodies are buffered so they can
//! be logged and then handed on unchanged.

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::Request,
    http::{request::Parts, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use http_body_util::LengthLimitError;
use serde_json::{json, Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

/// Largest inbound body accepted (and logged).
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

// ---

pub async fn log_traffic(request: Request, next: Next) -> Response {
    // ---
    let request_id = Uuid::new_v4();
    let (parts, body) = request.into_parts();

    let response = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => {
            info!("{}", request_record(&parts, &bytes, request_id));
            next.run(Request::from_parts(parts, Body::from(bytes))).await
        }
        Err(e) => {
            let mut record = request_record(&parts, &Bytes::new(), request_id);
            record["rejected"] = Value::from(e.to_string());
            warn!("{}", record);
            rejection_response(&e)
        }
    };

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(request_id = %request_id, "Failed to buffer response body: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    info!("{}", response_record(parts.status, &bytes, request_id));

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        parts.headers.insert(REQUEST_ID_HEADER, value);
    }

    Response::from_parts(parts, Body::from(bytes))
}

/// Log payload for an inbound request.
pub fn request_record(parts: &Parts, body: &Bytes, request_id: Uuid) -> Value {
    // ---
    json!({
        "request_id": request_id,
        "method": parts.method.as_str(),
        "url": parts.uri.to_string(),
        "headers": headers_to_json(&parts.headers),
        "body": body_to_json(body),
    })
}

/// Log payload for an outbound response.
pub fn response_record(status: StatusCode, body: &Bytes, request_id: Uuid) -> Value {
    // ---
    json!({
        "request_id": request_id,
        "status_code": status.as_u16(),
        "response_body": body_to_json(body),
    })
}

/// 413 when the body hit `MAX_BODY_BYTES`, 400 for any other read failure
/// (client hung up, malformed chunking, ...).
fn rejection_response(error: &axum::Error) -> Response {
    // ---
    if exceeded_length_limit(error) {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(json!({ "error": "Request body too large." })),
        )
            .into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Failed to read request body." })),
        )
            .into_response()
    }
}

fn exceeded_length_limit(error: &axum::Error) -> bool {
    // ---
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

fn headers_to_json(headers: &HeaderMap) -> Value {
    // ---
    let map: Map<String, Value> = headers
        .iter()
        .map(|(name, value)| {
            let value = value.to_str().unwrap_or("<non-utf8>");
            (name.as_str().to_string(), Value::from(value))
        })
        .collect();
    Value::Object(map)
}

/// Non-JSON (or empty) bodies log as `null`.
fn body_to_json(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap_or(Value::Null)
}
