use serde::{Deserialize, Serialize};

use crate::models::media_type::MediaType;
use crate::models::state::StreamState;

/// Point-in-time snapshot of a transform, for debugging hosts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformDiagnostics {
    pub state: StreamState,
    pub input_type: Option<MediaType>,
    pub output_type: Option<MediaType>,
    pub input_pending: u32,
    pub output_pending: u32,
    pub inputs_processed: u64,
    pub outputs_delivered: u64,
    pub need_input_events: u64,
    pub have_output_events: u64,
    pub drains_completed: u64,
    pub markers_placed: u64,
    pub surfaces_allocated: u64,
    pub pool_allocations: u64,
    pub device_losses: u64,
    pub device_epoch: u64,
    pub events_queued: usize,
    /// RFC 3339 capture time.
    pub captured_at: String,
}

impl TransformDiagnostics {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
