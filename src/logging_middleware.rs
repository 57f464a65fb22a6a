// src/logging_middleware.rs
//! Debug logging of JSON request and response bodies

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{debug, enabled, Level};

/// JSON bodies above this size are not logged
const MAX_LOGGED_BODY: usize = 64 * 1024;

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |ct| ct.starts_with("application/json"))
}

/// Log method, uri, status and latency, plus JSON bodies, at debug level.
///
/// Multipart uploads and file downloads pass through without being buffered,
/// and login responses are never logged.
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    if !enabled!(Level::DEBUG) {
        return Ok(next.run(request).await);
    }

    let started = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let request = if is_json(request.headers()) {
        let (parts, body) = request.into_parts();
        let bytes = to_bytes(body, usize::MAX)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        if bytes.len() <= MAX_LOGGED_BODY {
            debug!(
                method = %method,
                uri = %uri,
                request_body = %String::from_utf8_lossy(&bytes),
                "Request"
            );
        }
        Request::from_parts(parts, Body::from(bytes))
    } else {
        request
    };

    let response = next.run(request).await;
    let status = response.status();

    // Login responses carry session tokens
    let sensitive = uri.path().starts_with("/authenticate");

    let response = if !sensitive && is_json(response.headers()) {
        let (parts, body) = response.into_parts();
        let bytes = to_bytes(body, usize::MAX)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        if bytes.len() <= MAX_LOGGED_BODY {
            debug!(
                status = %status,
                response_body = %String::from_utf8_lossy(&bytes),
                "Response"
            );
        }
        Response::from_parts(parts, Body::from(bytes))
    } else {
        response
    };

    debug!(
        method = %method,
        uri = %uri,
        status = %status,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Request completed"
    );

    Ok(response)
}
