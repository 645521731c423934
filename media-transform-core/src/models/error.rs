use thiserror::Error;

/// Errors returned by the transform's host-facing calls.
///
/// Every variant except `DeviceLost`, `NoFreeSurface` and `StreamChange` is
/// terminal for the call that produced it and leaves the transform untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("transform is not accepting input")]
    NotAccepting,

    #[error("invalid media type: {0}")]
    InvalidMediaType(String),

    #[error("media type not set")]
    TypeNotSet,

    #[error("no more media types")]
    NoMoreTypes,

    #[error("transform needs more input")]
    NeedMoreInput,

    #[error("video device lost")]
    DeviceLost,

    #[error("no free surface in pool")]
    NoFreeSurface,

    /// The output format changed mid-stream. The buffered output is kept;
    /// read the new output type and call `process_output` again.
    #[error("output format changed")]
    StreamChange,

    #[error("out of memory")]
    OutOfMemory,

    #[error("transform is shut down")]
    Shutdown,

    #[error("event channel closed")]
    ChannelClosed,
}

impl TransformError {
    /// Whether the host may retry the same call after recovering
    /// (rebinding the device, releasing surfaces, renegotiating).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DeviceLost | Self::NoFreeSurface | Self::StreamChange)
    }

    pub(crate) fn invalid_stream(stream_id: u32) -> Self {
        Self::InvalidArgument(format!("invalid stream id: {}", stream_id))
    }
}
