//! Response and request helpers shared by the route handlers

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::types::HealthBotError;

/// Largest request body accepted by the JSON handlers
pub const MAX_BODY_BYTES: usize = 64 * 1024;

pub type FullBody = Full<Bytes>;

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: String,
    code: &'a str,
}

/// Response with CORS header and the given content type
pub fn bytes_response(
    status: StatusCode,
    content_type: &'static str,
    body: impl Into<Bytes>,
) -> Response<FullBody> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<FullBody> {
    let json = serde_json::to_vec(body).unwrap_or_else(|_| b"{}".to_vec());
    bytes_response(status, "application/json", json)
}

/// JSON error body `{"error", "code"}` with the error's status
pub fn error_response(err: &HealthBotError) -> Response<FullBody> {
    let status = err.status_code();
    if status.is_server_error() {
        warn!(error = %err, "Request failed");
    }
    json_response(
        status,
        &ErrorBody {
            error: err.to_string(),
            code: err.code(),
        },
    )
}

/// Collapse a handler result into a response
pub fn into_response<T: Serialize>(
    status: StatusCode,
    result: crate::types::Result<T>,
) -> Response<FullBody> {
    match result {
        Ok(body) => json_response(status, &body),
        Err(e) => error_response(&e),
    }
}

/// Parse a JSON request body
pub fn parse_json<T: DeserializeOwned>(body: &[u8]) -> crate::types::Result<T> {
    if body.is_empty() {
        return Err(HealthBotError::BadRequest("Request body is required".into()));
    }
    serde_json::from_slice(body)
        .map_err(|e| HealthBotError::BadRequest(format!("Invalid JSON: {}", e)))
}

/// Parse a query string into a typed struct; a missing query parses as empty
pub fn parse_query<T: DeserializeOwned>(query: Option<&str>) -> crate::types::Result<T> {
    serde_urlencoded::from_str(query.unwrap_or(""))
        .map_err(|e| HealthBotError::BadRequest(format!("Invalid query: {}", e)))
}

/// Percent-decode one path segment
pub fn path_segment(raw: &str) -> crate::types::Result<String> {
    let decoded = urlencoding::decode(raw)
        .map_err(|_| HealthBotError::BadRequest("Invalid path encoding".into()))?;
    if decoded.trim().is_empty() {
        return Err(HealthBotError::BadRequest("Empty path parameter".into()));
    }
    Ok(decoded.into_owned())
}
