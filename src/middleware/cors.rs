//! Permissive CORS headers and a JSON content type on every response,
//! including errors and preflights.

use axum::extract::Request;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE,
};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;

pub const ALLOW_METHODS: &str = "POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Axum middleware that stamps the CORS headers after the handler runs.
pub async fn apply_cors(allow_origin: HeaderValue, req: Request, next: Next) -> Response {
    let mut resp = next.run(req).await;
    let headers = resp.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    resp
}

/// Parse the configured origin, falling back to `*` when it is not a
/// valid header value.
pub fn allow_origin_header(origin: &str) -> HeaderValue {
    HeaderValue::from_str(origin).unwrap_or_else(|_| {
        tracing::warn!(origin, "invalid CORS origin, using *");
        HeaderValue::from_static("*")
    })
}
