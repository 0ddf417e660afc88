//! Client for the queue-join protocol spoken by hosted inference backends.
//!
//! Each job opens its own connection, answers the server's `send_hash` and
//! `send_data` requests, and resolves on `process_completed`. Nothing is
//! pooled or shared between jobs apart from the read-only credentials.

pub mod credentials;
pub mod endpoint;
pub mod errors;
pub mod handshake;
pub mod message;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub use credentials::QueueCredentials;
pub use endpoint::{join_url, Scheme};
pub use errors::QueueError;
pub use handshake::{Handshake, Step};

use session::Session;

/// Default inbound message ceiling: large enough for media encoded as data URLs.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 1024 * 1024 * 1024;

/// What to submit and where.
#[derive(Debug, Clone)]
pub struct JobRequest {
    /// Positional arguments in the order the remote function expects.
    pub payload: Vec<Value>,
    pub fn_index: u32,
    /// Backend location, e.g. `name.hf.space/`.
    pub host: String,
}

/// Queue client configuration.
#[derive(Debug, Clone)]
pub struct QueueClientConfig {
    pub scheme: Scheme,
    pub credentials: QueueCredentials,
    pub timeout: Duration,
    pub max_message_size: usize,
}

/// Submits jobs. Cheap to share; holds no per-job state.
#[derive(Debug, Clone)]
pub struct QueueClient {
    config: QueueClientConfig,
}

impl QueueClient {
    pub fn new(config: QueueClientConfig) -> Self {
        Self { config }
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Run one job to its terminal outcome and return the raw `output`.
    ///
    /// The whole exchange, connection included, runs under the configured
    /// deadline. On timeout the connection is dropped.
    pub async fn submit(&self, job: JobRequest) -> Result<Value, QueueError> {
        let url = join_url(self.config.scheme, &job.host)?;
        let session_hash = Uuid::new_v4().to_string();
        let started = Instant::now();

        info!(
            url = %url,
            fn_index = job.fn_index,
            session_hash = %session_hash,
            "submitting job"
        );

        let handshake = Handshake::new(job.fn_index, session_hash.clone(), job.payload);
        let exchange = async {
            let mut session = Session::open(
                &url,
                &self.config.credentials,
                self.config.max_message_size,
            )
            .await?;
            let outcome = drive(&mut session, handshake).await;
            session.close().await;
            outcome
        };

        let outcome = match tokio::time::timeout(self.config.timeout, exchange).await {
            Ok(outcome) => outcome,
            Err(_) => Err(QueueError::Timeout(self.config.timeout)),
        };

        let elapsed_ms = started.elapsed().as_millis();
        match &outcome {
            Ok(_) => info!(session_hash = %session_hash, elapsed_ms, "job completed"),
            Err(e) => warn!(session_hash = %session_hash, elapsed_ms, error = %e, "job failed"),
        }

        outcome
    }
}

/// Feed server messages to the handshake strictly in arrival order until it
/// reaches a terminal step.
async fn drive(session: &mut Session, mut handshake: Handshake) -> Result<Value, QueueError> {
    loop {
        let msg = session.next_message().await?;
        debug!(
            session_hash = %handshake.session_hash(),
            kind = msg.kind(),
            "queue message"
        );

        match handshake.on_message(msg) {
            Step::Reply(reply) => session.send(&reply).await?,
            Step::Wait => {}
            Step::Complete(output) => return Ok(output),
            Step::Fail(err) => return Err(err),
        }
    }
}
