//! Field extraction shared by the adapters. A field counts as absent when it
//! is missing or `null`.

use serde_json::{Map, Value};

use super::BackendError;

pub type Body = Map<String, Value>;

fn present<'a>(body: &'a Body, key: &str) -> Option<&'a Value> {
    body.get(key).filter(|v| !v.is_null())
}

pub fn required_str(body: &Body, key: &str) -> Result<String, BackendError> {
    match present(body, key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(BackendError::InvalidRequest(format!(
            "field `{key}` must be a string, got {}",
            type_name(other)
        ))),
        None => Err(BackendError::InvalidRequest(format!(
            "missing required field `{key}`"
        ))),
    }
}

pub fn optional_f64(body: &Body, key: &str, default: f64) -> Result<f64, BackendError> {
    match present(body, key) {
        Some(v) => v.as_f64().ok_or_else(|| {
            BackendError::InvalidRequest(format!(
                "field `{key}` must be a number, got {}",
                type_name(v)
            ))
        }),
        None => Ok(default),
    }
}

pub fn optional_value(body: &Body, key: &str, default: Value) -> Value {
    present(body, key).cloned().unwrap_or(default)
}

/// Conversation history as a fresh list of `[input, response]` pairs.
/// Absent means an empty conversation.
pub fn history(body: &Body) -> Result<Vec<Value>, BackendError> {
    let Some(value) = present(body, "history") else {
        return Ok(Vec::new());
    };
    let turns = value.as_array().ok_or_else(|| {
        BackendError::InvalidRequest(format!(
            "field `history` must be a list, got {}",
            type_name(value)
        ))
    })?;

    for (i, turn) in turns.iter().enumerate() {
        if !turn.as_array().is_some_and(|pair| pair.len() == 2) {
            return Err(BackendError::InvalidRequest(format!(
                "history[{i}] must be an [input, response] pair"
            )));
        }
    }

    Ok(turns.clone())
}

/// Reply text of the last turn in `output.data[index]`, a list of pairs.
pub fn last_reply(output: &Value, index: usize) -> Result<Value, BackendError> {
    let turns = output
        .get("data")
        .and_then(|data| data.get(index))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            BackendError::UnexpectedShape(format!("expected a list of turns at data[{index}]"))
        })?;

    let last = turns
        .last()
        .ok_or_else(|| BackendError::UnexpectedShape(format!("data[{index}] has no turns")))?;

    last.get(1)
        .filter(|reply| !reply.is_null())
        .cloned()
        .ok_or_else(|| {
            BackendError::UnexpectedShape(format!("last turn in data[{index}] has no reply"))
        })
}

/// Element `index` of `output.data`, which must be present and non-null.
pub fn data_item(output: &Value, index: usize) -> Result<Value, BackendError> {
    output
        .get("data")
        .and_then(Value::as_array)
        .and_then(|data| data.get(index))
        .filter(|item| !item.is_null())
        .cloned()
        .ok_or_else(|| BackendError::UnexpectedShape(format!("no output at data[{index}]")))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
