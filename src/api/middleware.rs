//! API Middleware
//!
//! Request logging. Auth and rate limiting live in the upstream gateway and
//! are out of scope here.

use axum::{body::Body, http::Request, middleware::Next, response::Response};

/// Log every request with method, path, status and latency.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let start = std::time::Instant::now();

    tracing::info!(
        method = %method,
        uri = %uri,
        "Incoming request"
    );

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %response.status(),
        latency_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );

    response
}
