//! # media-transform-core
//!
//! Asynchronous notify-then-pull media transform stage.
//!
//! The host never pushes or pulls blindly: the transform announces, through
//! an event channel, when it can take one more input (NeedInput) and when an
//! output is ready (HaveOutput). Audio is converted from 16-bit PCM stereo to
//! 32-bit float; video frames pass through into host memory or into a pool
//! of device surfaces that survives device loss and geometry changes.
//!
//! ## Architecture
//!
//! ```text
//! media-transform-core (this crate)
//! ├── traits/       ← Transform, EventSource, Shutdownable, VideoDevice
//! ├── models/       ← TransformError, StreamState, MediaType, MediaSample, TransformEvent, etc.
//! ├── events/       ← EventQueue (blocking FIFO with shutdown)
//! ├── processing/   ← SamplePipeline, PCM conversion, pitched row copy, type negotiation
//! ├── surface/      ← SurfaceManager, SurfacePool, Surface, SystemMemoryDevice
//! └── session/      ← FlowControl, AsyncTransform (the orchestrator)
//! ```

pub mod events;
pub mod models;
pub mod processing;
pub mod session;
pub mod surface;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use events::event_queue::EventQueue;
pub use models::config::{TransformConfiguration, SURFACE_POOL_SIZE};
pub use models::diagnostics::TransformDiagnostics;
pub use models::error::TransformError;
pub use models::event::{EventKind, TransformEvent};
pub use models::media_type::{AudioFormat, AudioSubtype, MediaType, VideoFormat, VideoSubtype};
pub use models::message::TransformMessage;
pub use models::sample::{MediaBuffer, MediaSample, MemoryBuffer, OutputDataBuffer};
pub use models::state::StreamState;
pub use models::stream_info::{StreamCount, StreamInfo, StreamLimits};
pub use processing::sample_pipeline::SamplePipeline;
pub use session::async_transform::AsyncTransform;
pub use session::flow_control::{FlowControl, MAX_INPUT_PENDING};
pub use surface::handle::{Surface, SurfaceId, SurfaceMemory};
pub use surface::manager::{SurfaceManager, SurfaceStats};
pub use surface::system_memory::SystemMemoryDevice;
pub use traits::event_source::EventSource;
pub use traits::shutdownable::Shutdownable;
pub use traits::transform::Transform;
pub use traits::video_device::VideoDevice;
