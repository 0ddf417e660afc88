use thiserror::Error;

use crate::queue::QueueError;

/// Errors surfaced by an endpoint adapter.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The inbound body is missing a required field or has the wrong type.
    /// Raised before any connection is opened.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Queue(#[from] QueueError),

    /// The backend answered, but not in the shape this adapter reads.
    #[error("unexpected backend output: {0}")]
    UnexpectedShape(String),
}
