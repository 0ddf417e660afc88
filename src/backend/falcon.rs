use serde_json::Value;

use super::fields::{history, last_reply, optional_f64, required_str, Body};
use super::{Backend, BackendError};

pub const DEFAULT_HOST: &str = "huggingfaceh4-falcon-chat.hf.space/";

const FN_INDEX: u32 = 1;
const DEFAULT_TEMPERATURE: f64 = 0.75;
const DEFAULT_TOP_P: f64 = 0.9;

/// Falcon-40B chat: `[input, history, instruction, temperature, top_p]`,
/// answers with the updated chat in `data[0]`.
pub struct Falcon {
    host: String,
}

impl Falcon {
    pub fn new(host: Option<String>) -> Self {
        Self {
            host: host.unwrap_or_else(|| DEFAULT_HOST.into()),
        }
    }
}

impl Backend for Falcon {
    fn name(&self) -> &str {
        "falcon-40b"
    }

    fn route(&self) -> &str {
        "/falcon-40b-api"
    }

    fn host(&self) -> &str {
        &self.host
    }

    fn fn_index(&self) -> u32 {
        FN_INDEX
    }

    fn build_payload(&self, body: &Body) -> Result<Vec<Value>, BackendError> {
        let input = required_str(body, "input")?;
        let instruction = required_str(body, "instruction")?;
        let history = history(body)?;
        let temperature = optional_f64(body, "temperature", DEFAULT_TEMPERATURE)?;
        let top_p = optional_f64(body, "top_p", DEFAULT_TOP_P)?;

        Ok(vec![
            Value::String(input),
            Value::Array(history),
            Value::String(instruction),
            temperature.into(),
            top_p.into(),
        ])
    }

    fn extract(&self, output: &Value) -> Result<Value, BackendError> {
        last_reply(output, 0)
    }
}
