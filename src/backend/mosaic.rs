use serde_json::Value;

use super::fields::{history, last_reply, required_str, Body};
use super::{Backend, BackendError};

pub const DEFAULT_HOST: &str = "mosaicml-mpt-30b-chat.hf.space/";

const FN_INDEX: u32 = 1;

/// Reply slot of the turn appended before submission; the remote function
/// fills it in place.
const PENDING_REPLY: &str = "...";

/// MPT-30B chat: `[instruction, history]` where history already ends with the
/// new input. The updated chat comes back in `data[1]`.
pub struct Mosaic {
    host: String,
}

impl Mosaic {
    pub fn new(host: Option<String>) -> Self {
        Self {
            host: host.unwrap_or_else(|| DEFAULT_HOST.into()),
        }
    }
}

impl Backend for Mosaic {
    fn name(&self) -> &str {
        "mosaic-30b"
    }

    fn route(&self) -> &str {
        "/mosaic-30b-api"
    }

    fn host(&self) -> &str {
        &self.host
    }

    fn fn_index(&self) -> u32 {
        FN_INDEX
    }

    fn build_payload(&self, body: &Body) -> Result<Vec<Value>, BackendError> {
        let instruction = required_str(body, "instruction")?;
        let input = required_str(body, "input")?;

        let mut history = history(body)?;
        history.push(Value::Array(vec![
            Value::String(input),
            Value::String(PENDING_REPLY.into()),
        ]));

        Ok(vec![Value::String(instruction), Value::Array(history)])
    }

    fn extract(&self, output: &Value) -> Result<Value, BackendError> {
        last_reply(output, 1)
    }
}
