use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Extension, State};
use axum::Json;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::backend::{Backend, BackendError, Body};
use crate::protocol::{Envelope, HealthResponse};
use crate::queue::QueueClient;

/// Shared application state.
pub struct AppState {
    pub queue: QueueClient,
    pub backends: Vec<Arc<dyn Backend>>,
}

/// Health check handler.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        backends: state
            .backends
            .iter()
            .map(|b| b.name().to_string())
            .collect(),
    })
}

/// Job summary attached to the response for the logging middleware.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub backend: String,
    pub success: bool,
}

/// Job endpoint. The backend is attached to each route as an extension.
/// Failures are reported in the envelope, never as an HTTP error status.
pub async fn job(
    State(state): State<Arc<AppState>>,
    Extension(backend): Extension<Arc<dyn Backend>>,
    body: Bytes,
) -> (Extension<JobOutcome>, Json<Envelope>) {
    let envelope = run_job(&state.queue, backend.as_ref(), &body).await;
    let outcome = JobOutcome {
        backend: backend.name().to_string(),
        success: matches!(envelope, Envelope::Success(_)),
    };
    (Extension(outcome), Json(envelope))
}

/// Validate, submit, and extract one job.
pub async fn run_job(queue: &QueueClient, backend: &dyn Backend, raw: &[u8]) -> Envelope {
    match try_run_job(queue, backend, raw).await {
        Ok(content) => Envelope::Success(content),
        Err(e) => {
            match &e {
                BackendError::InvalidRequest(_) => {
                    warn!(backend = backend.name(), error = %e, "rejected request")
                }
                BackendError::Queue(_) | BackendError::UnexpectedShape(_) => {
                    error!(backend = backend.name(), error = %e, "job failed")
                }
            }
            Envelope::Error(e.to_string())
        }
    }
}

async fn try_run_job(
    queue: &QueueClient,
    backend: &dyn Backend,
    raw: &[u8],
) -> Result<Value, BackendError> {
    let body = parse_body(raw)?;
    let purpose = body.get("purpose").and_then(Value::as_str).unwrap_or("-");

    let job = backend.job(&body)?;
    info!(backend = backend.name(), purpose, "job called");

    let output = queue.submit(job).await?;
    let content = backend.extract(&output)?;

    info!(backend = backend.name(), purpose, "job result ready");
    Ok(content)
}

fn parse_body(raw: &[u8]) -> Result<Body, BackendError> {
    match serde_json::from_slice::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(BackendError::InvalidRequest(
            "request body must be a JSON object".into(),
        )),
        Err(e) => Err(BackendError::InvalidRequest(format!(
            "request body is not valid JSON: {e}"
        ))),
    }
}
