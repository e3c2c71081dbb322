//! Request logging middleware
//!
//! One line when a request starts and one when it completes, tagged with the
//! `x-request-id` set by the request-id layer.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tower_http::request_id::RequestId;
use tracing::{info, warn};

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();

    let request_id = req
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| "-".to_string());
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Request started"
    );

    let response = next.run(req).await;
    let status = response.status().as_u16();
    let latency_ms = start.elapsed().as_millis() as u64;

    if response.status().is_server_error() {
        warn!(request_id = %request_id, method = %method, path = %path, status, latency_ms, "Request failed");
    } else if response.status().is_client_error() {
        warn!(request_id = %request_id, method = %method, path = %path, status, latency_ms, "Request rejected");
    } else {
        info!(request_id = %request_id, method = %method, path = %path, status, latency_ms, "Request completed");
    }

    response
}
