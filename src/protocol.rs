use serde::Serialize;
use serde_json::Value;

/// Envelope returned for every job call, success or not.
#[derive(Debug, Serialize)]
#[serde(tag = "status", content = "content", rename_all = "lowercase")]
pub enum Envelope {
    Success(Value),
    Error(String),
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub backends: Vec<String>,
}
