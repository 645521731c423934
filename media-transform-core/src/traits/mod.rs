pub mod event_source;
pub mod shutdownable;
pub mod transform;
pub mod video_device;
