use std::time::Duration;

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Queue protocol errors. Every variant is terminal for the job.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue is full, please try again")]
    QueueFull,

    #[error("transport error: {0}")]
    Transport(#[source] tungstenite::Error),

    #[error("connection closed before the job completed")]
    Closed,

    #[error("malformed server message: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("failed to encode client message: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("job timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("backend rejected the job: {0}")]
    Rejected(String),

    #[error("invalid backend url: {0}")]
    InvalidUrl(String),
}

impl From<tungstenite::Error> for QueueError {
    fn from(err: tungstenite::Error) -> Self {
        match err {
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                QueueError::Closed
            }
            other => QueueError::Transport(other),
        }
    }
}
