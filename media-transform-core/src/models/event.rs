/// Kind of notification raised by the transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// One more input submission is permitted.
    NeedInput,
    /// One output unit is ready to retrieve.
    HaveOutput,
    /// A drain request finished; all in-flight output was delivered.
    DrainComplete,
    /// A host-placed marker reached the head of the stream.
    Marker,
    /// The transform shut down; no further events follow.
    ShutdownComplete,
}

/// Notification consumed by the host through the event channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformEvent {
    pub kind: EventKind,
    pub stream_id: u32,
    /// Host-supplied correlation token (markers only).
    pub context: Option<u64>,
}

impl TransformEvent {
    pub fn need_input(stream_id: u32) -> Self {
        Self::new(EventKind::NeedInput, stream_id)
    }

    pub fn have_output(stream_id: u32) -> Self {
        Self::new(EventKind::HaveOutput, stream_id)
    }

    pub fn drain_complete(stream_id: u32) -> Self {
        Self::new(EventKind::DrainComplete, stream_id)
    }

    pub fn marker(stream_id: u32, token: u64) -> Self {
        Self {
            kind: EventKind::Marker,
            stream_id,
            context: Some(token),
        }
    }

    pub fn shutdown_complete() -> Self {
        Self::new(EventKind::ShutdownComplete, 0)
    }

    fn new(kind: EventKind, stream_id: u32) -> Self {
        Self {
            kind,
            stream_id,
            context: None,
        }
    }
}
