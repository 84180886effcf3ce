//! Cross-cutting layers: request logging, CORS and panic recovery.

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{header, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};

use super::config::BODY_LIMIT_BYTES;
use super::error::{ErrorBody, INTERNAL_SERVER_ERROR};

/// Log method and URI of every request, plus the body of writes.
///
/// The body is buffered and handed on unchanged; an oversized body is
/// answered with 413 here.
pub async fn log_requests(request: Request, next: Next) -> Response {
    tracing::info!(method = %request.method(), uri = %request.uri(), "request");

    if !matches!(*request.method(), Method::POST | Method::PUT) {
        return next.run(request).await;
    }

    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, BODY_LIMIT_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(error = %err, "Failed to read request body");
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(ErrorBody::new("Request body too large")),
            )
                .into_response();
        }
    };
    tracing::debug!(body = %String::from_utf8_lossy(&bytes), "request body");

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

/// Any origin, the methods the API serves, and the usual request headers.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::OPTIONS,
            Method::POST,
            Method::PUT,
        ])
        .allow_headers([
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            header::ORIGIN,
            header::ACCEPT,
            header::HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
            header::ACCESS_CONTROL_REQUEST_METHOD,
            header::ACCESS_CONTROL_REQUEST_HEADERS,
        ])
}

/// Returns a `CatchPanicLayer` that converts panics into JSON 500 responses.
pub fn catch_panic_layer() -> CatchPanicLayer<fn(Box<dyn std::any::Any + Send>) -> Response> {
    CatchPanicLayer::custom(panic_handler as fn(_) -> _)
}

fn panic_handler(err: Box<dyn std::any::Any + Send>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "Handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new(INTERNAL_SERVER_ERROR)),
    )
        .into_response()
}
