pub mod config;
pub mod diagnostics;
pub mod error;
pub mod event;
pub mod media_type;
pub mod message;
pub mod sample;
pub mod state;
pub mod stream_info;
