use std::time::Instant;

use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{error, info, warn};

use super::handlers::JobOutcome;

/// Request logging. Health checks are skipped. Job routes report the backend
/// and the envelope status, since job failures still answer 200.
pub async fn logging_middleware(req: Request<Body>, next: Next) -> Response {
    if req.uri().path() == "/health" {
        return next.run(req).await;
    }

    let path = req.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let duration_ms = start.elapsed().as_millis() as u64;
    let job = response.extensions().get::<JobOutcome>();
    let backend = job.map(|j| j.backend.as_str());
    let outcome = job.map(|j| if j.success { "success" } else { "error" });

    match (status, job) {
        (500.., _) => error!(path, status, backend, duration_ms, "request"),
        // 413 from the body limit lands here.
        (400..=499, _) => warn!(path, status, backend, duration_ms, "request"),
        (_, Some(j)) if !j.success => {
            warn!(path, status, backend, outcome, duration_ms, "job request")
        }
        (_, Some(_)) => info!(path, status, backend, outcome, duration_ms, "job request"),
        (_, None) => info!(path, status, duration_ms, "request"),
    }

    response
}
