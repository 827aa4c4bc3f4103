//! Shared utilities for integration tests.

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use secure_headers::ServerConfig;
use tower::ServiceExt;

/// Drive one request through the fully layered router.
#[allow(dead_code)]
pub async fn send(router: Router, request: Request<Body>) -> Response<Body> {
    router.oneshot(request).await.unwrap()
}

/// Plain GET request for `uri`.
#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Default config bound to an ephemeral local port.
#[allow(dead_code)]
pub fn local_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config
}
