use serde_json::Value;
use tracing::debug;

use super::message::{ClientMessage, ServerMessage};
use super::QueueError;

/// Where a job stands in the queue-join exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    AwaitingServerMessage,
    Completed,
    Failed,
}

/// What the driver must do after feeding one server message.
#[derive(Debug)]
pub enum Step<'a> {
    /// Send this reply, then keep reading.
    Reply(ClientMessage<'a>),
    /// Nothing to send; keep reading.
    Wait,
    Complete(Value),
    Fail(QueueError),
}

/// Pure state machine for one job. It never produces a message unless the
/// server asked for it, and it reaches a terminal state at most once.
#[derive(Debug)]
pub struct Handshake {
    fn_index: u32,
    session_hash: String,
    payload: Vec<Value>,
    state: HandshakeState,
}

impl Handshake {
    pub fn new(fn_index: u32, session_hash: String, payload: Vec<Value>) -> Self {
        Self {
            fn_index,
            session_hash,
            payload,
            state: HandshakeState::AwaitingServerMessage,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> HandshakeState {
        self.state
    }

    pub fn session_hash(&self) -> &str {
        &self.session_hash
    }

    /// Advance on one inbound message.
    pub fn on_message(&mut self, msg: ServerMessage) -> Step<'_> {
        if self.state != HandshakeState::AwaitingServerMessage {
            return Step::Wait;
        }

        match msg {
            ServerMessage::QueueFull => {
                self.state = HandshakeState::Failed;
                Step::Fail(QueueError::QueueFull)
            }
            ServerMessage::SendHash => Step::Reply(ClientMessage::Hash {
                fn_index: self.fn_index,
                session_hash: &self.session_hash,
            }),
            ServerMessage::SendData => Step::Reply(ClientMessage::Data {
                data: &self.payload,
                fn_index: self.fn_index,
                session_hash: &self.session_hash,
            }),
            ServerMessage::ProcessCompleted {
                success: Some(false),
                output,
            } => {
                self.state = HandshakeState::Failed;
                let reason = output
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("no error detail")
                    .to_string();
                Step::Fail(QueueError::Rejected(reason))
            }
            ServerMessage::ProcessCompleted { output, .. } => {
                self.state = HandshakeState::Completed;
                Step::Complete(output)
            }
            ServerMessage::Estimation {
                rank,
                queue_size,
                rank_eta,
            } => {
                debug!(
                    session_hash = %self.session_hash,
                    rank,
                    queue_size,
                    rank_eta,
                    "queue position"
                );
                Step::Wait
            }
            ServerMessage::ProcessStarts | ServerMessage::ProcessGenerating | ServerMessage::Other => {
                Step::Wait
            }
        }
    }
}
