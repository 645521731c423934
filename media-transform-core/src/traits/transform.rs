use crate::models::error::TransformError;
use crate::models::media_type::MediaType;
use crate::models::message::TransformMessage;
use crate::models::sample::{MediaSample, OutputDataBuffer};
use crate::models::stream_info::{StreamCount, StreamInfo, StreamLimits};

/// Host-facing call surface of an asynchronous transform.
///
/// Calls are synchronous and internally serialized; completion of work is
/// announced through the transform's [`EventSource`](super::event_source::EventSource).
pub trait Transform: Send + Sync {
    // --- Lifecycle ---

    /// Reset flow control and issue the first NeedInput. Transitions: idle → streaming.
    fn start_stream(&self) -> Result<(), TransformError>;

    /// End of the input stream. Transitions: any → idle, no event.
    fn end_of_stream(&self, stream_id: u32) -> Result<(), TransformError>;

    /// Stop accepting input; DrainComplete follows once in-flight output is delivered.
    fn drain(&self) -> Result<(), TransformError>;

    /// Discard buffered output and outstanding credits. No event.
    fn flush(&self) -> Result<(), TransformError>;

    /// Queue a Marker event carrying `token`, ordered with data events.
    fn place_marker(&self, token: u64) -> Result<(), TransformError>;

    /// Dispatch a host message onto the calls above.
    fn process_message(&self, message: TransformMessage) -> Result<(), TransformError>;

    // --- Negotiation ---

    fn stream_limits(&self) -> StreamLimits;

    fn stream_count(&self) -> StreamCount;

    fn input_stream_info(&self, stream_id: u32) -> Result<StreamInfo, TransformError>;

    fn output_stream_info(&self, stream_id: u32) -> Result<StreamInfo, TransformError>;

    fn input_available_type(&self, stream_id: u32, index: usize) -> Result<MediaType, TransformError>;

    fn output_available_type(&self, stream_id: u32, index: usize) -> Result<MediaType, TransformError>;

    /// Validate without applying.
    fn check_input_type(&self, stream_id: u32, media_type: &MediaType) -> Result<(), TransformError>;

    /// Validate without applying.
    fn check_output_type(&self, stream_id: u32, media_type: &MediaType) -> Result<(), TransformError>;

    /// Mid-stream, a new input type re-derives the output type; the change
    /// is reported by the first `process_output` produced under it.
    fn set_input_type(&self, stream_id: u32, media_type: MediaType) -> Result<(), TransformError>;

    fn set_output_type(&self, stream_id: u32, media_type: MediaType) -> Result<(), TransformError>;

    fn input_current_type(&self, stream_id: u32) -> Result<MediaType, TransformError>;

    fn output_current_type(&self, stream_id: u32) -> Result<MediaType, TransformError>;

    // --- Data path ---

    /// Whether `process_input` would accept a sample right now.
    fn input_status(&self, stream_id: u32) -> Result<bool, TransformError>;

    /// Whether a processed sample is waiting in the output slot.
    fn output_status(&self) -> Result<bool, TransformError>;

    fn process_input(&self, stream_id: u32, sample: MediaSample) -> Result<(), TransformError>;

    /// Fails with [`TransformError::StreamChange`] once after a mid-stream
    /// format change; the output stays buffered for the next call.
    fn process_output(&self, output: &mut OutputDataBuffer) -> Result<(), TransformError>;
}
