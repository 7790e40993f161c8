//! Request logging middleware.
//!
//! One line per request with method, path, status and latency.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn};

pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    // Liveness probes are noise
    if path == "/health" {
        return next.run(request).await;
    }

    let start = Instant::now();
    let response = next.run(request).await;
    let latency_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();

    if status >= 500 {
        warn!(method = %method, path = %path, status, latency_ms, "Request failed (5xx)");
    } else if status == 401 || status == 403 {
        info!(method = %method, path = %path, status, latency_ms, "Request denied");
    } else {
        info!(method = %method, path = %path, status, latency_ms, "Request completed");
    }

    response
}
