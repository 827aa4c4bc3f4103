//! Built-in handlers served behind the security header middleware.

use axum::{
    http::header::{HeaderValue, X_CONTENT_TYPE_OPTIONS},
    response::IntoResponse,
    Json,
};
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthStatus {
    pub version: &'static str,
    pub status: &'static str,
}

pub async fn index() -> &'static str {
    "secure-headers"
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "ok",
    })
}

/// Sets its own `X-Content-Type-Options`, which the middleware must keep.
pub async fn custom_headers() -> impl IntoResponse {
    (
        [(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("custom"))],
        "handler-provided headers",
    )
}
