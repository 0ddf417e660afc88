pub mod errors;
pub mod falcon;
pub mod fields;
pub mod mosaic;
pub mod speech;

use serde_json::Value;

pub use errors::BackendError;
pub use falcon::Falcon;
pub use fields::Body;
pub use mosaic::Mosaic;
pub use speech::Speech;

use crate::queue::JobRequest;

/// An inference backend reachable through the job queue.
///
/// Adapters only shape data: `build_payload` maps an inbound body to the
/// backend's positional arguments and `extract` reads the caller's value out
/// of the completion output. The queue exchange itself is shared.
pub trait Backend: Send + Sync {
    /// Human-readable name for this backend.
    fn name(&self) -> &str;

    /// HTTP route this backend is mounted on.
    fn route(&self) -> &str;

    /// Queue host, e.g. `name.hf.space/`.
    fn host(&self) -> &str;

    /// Remote function the payload is routed to.
    fn fn_index(&self) -> u32;

    /// Positional payload for the remote function.
    fn build_payload(&self, body: &Body) -> Result<Vec<Value>, BackendError>;

    /// Final value from the raw completion output.
    fn extract(&self, output: &Value) -> Result<Value, BackendError>;

    /// Build the job for one inbound call.
    fn job(&self, body: &Body) -> Result<JobRequest, BackendError> {
        Ok(JobRequest {
            payload: self.build_payload(body)?,
            fn_index: self.fn_index(),
            host: self.host().to_string(),
        })
    }
}
