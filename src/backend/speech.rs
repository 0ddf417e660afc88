use serde_json::Value;

use super::fields::{data_item, optional_f64, optional_value, required_str, Body};
use super::{Backend, BackendError};

const DEFAULT_SPEED: f64 = 1.0;

/// Speech synthesis: `[input, model, speed, symbol]`, answers with an audio
/// artifact at `data[0]`. Host and function index depend on the deployment.
pub struct Speech {
    host: String,
    fn_index: u32,
}

impl Speech {
    pub fn new(host: String, fn_index: u32) -> Self {
        Self { host, fn_index }
    }
}

impl Backend for Speech {
    fn name(&self) -> &str {
        "speech"
    }

    fn route(&self) -> &str {
        "/speech-api"
    }

    fn host(&self) -> &str {
        &self.host
    }

    fn fn_index(&self) -> u32 {
        self.fn_index
    }

    fn build_payload(&self, body: &Body) -> Result<Vec<Value>, BackendError> {
        let input = required_str(body, "input")?;
        let model = required_str(body, "model")?;
        let speed = optional_f64(body, "speed", DEFAULT_SPEED)?;
        let symbol = optional_value(body, "symbol", Value::Bool(false));

        Ok(vec![
            Value::String(input),
            Value::String(model),
            speed.into(),
            symbol,
        ])
    }

    fn extract(&self, output: &Value) -> Result<Value, BackendError> {
        data_item(output, 0)
    }
}
