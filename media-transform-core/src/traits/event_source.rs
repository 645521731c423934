use std::time::Duration;

use crate::models::error::TransformError;
use crate::models::event::TransformEvent;

/// Pull side of the notification channel.
pub trait EventSource: Send + Sync {
    /// Next queued event without blocking.
    ///
    /// `Ok(None)` when nothing is queued; `Err(ChannelClosed)` once the
    /// transform has shut down and every queued event was consumed.
    fn poll_event(&self) -> Result<Option<TransformEvent>, TransformError>;

    /// Block up to `timeout` for the next event.
    ///
    /// `Ok(None)` on timeout. Shutdown wakes the waiter.
    fn wait_event(&self, timeout: Duration) -> Result<Option<TransformEvent>, TransformError>;
}
