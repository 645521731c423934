use serde::{Deserialize, Serialize};

/// Stream state of the flow-control state machine.
///
/// State transitions:
/// ```text
/// idle ──start──→ streaming ──drain (output pending)──→ draining
///  ↑                 │                                     │
///  └── flush / eos / drain (nothing pending) ←── last output delivered
///
/// any state ──shutdown──→ shut down (terminal)
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamState {
    #[default]
    Idle,
    Streaming,
    Draining,
    ShutDown,
}

impl StreamState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::Streaming)
    }

    pub fn is_draining(&self) -> bool {
        matches!(self, Self::Draining)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ShutDown)
    }
}
