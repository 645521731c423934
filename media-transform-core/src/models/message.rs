use std::fmt;
use std::sync::Arc;

use crate::traits::video_device::VideoDevice;

/// Host command delivered through `Transform::process_message`.
#[derive(Clone)]
pub enum TransformMessage {
    CommandFlush,
    CommandDrain,
    /// Place a marker carrying the host's correlation token.
    CommandMarker(u64),
    /// Bind a video device, or release the current one with `None`.
    SetDevice(Option<Arc<dyn VideoDevice>>),
    NotifyBeginStreaming,
    NotifyEndStreaming,
    NotifyStartOfStream,
    NotifyEndOfStream(u32),
}

impl fmt::Debug for TransformMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommandFlush => write!(f, "CommandFlush"),
            Self::CommandDrain => write!(f, "CommandDrain"),
            Self::CommandMarker(token) => write!(f, "CommandMarker({})", token),
            Self::SetDevice(Some(device)) => write!(f, "SetDevice({})", device.name()),
            Self::SetDevice(None) => write!(f, "SetDevice(None)"),
            Self::NotifyBeginStreaming => write!(f, "NotifyBeginStreaming"),
            Self::NotifyEndStreaming => write!(f, "NotifyEndStreaming"),
            Self::NotifyStartOfStream => write!(f, "NotifyStartOfStream"),
            Self::NotifyEndOfStream(id) => write!(f, "NotifyEndOfStream({})", id),
        }
    }
}
