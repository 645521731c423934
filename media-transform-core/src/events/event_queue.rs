use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::models::error::TransformError;
use crate::models::event::TransformEvent;

#[derive(Debug, Default)]
struct QueueState {
    events: VecDeque<TransformEvent>,
    shut_down: bool,
}

/// Ordered, thread-safe notification queue.
///
/// Any number of producers may enqueue concurrently; events are handed out
/// FIFO to a single logical consumer. After `shutdown`, events already queued
/// still drain, and once the queue is empty every dequeue reports
/// [`TransformError::ChannelClosed`].
#[derive(Debug, Default)]
pub struct EventQueue {
    state: Mutex<QueueState>,
    available: Condvar,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, event: TransformEvent) -> Result<(), TransformError> {
        let mut state = self.state.lock();
        if state.shut_down {
            return Err(TransformError::ChannelClosed);
        }
        log::trace!("queue event {:?} (depth {})", event.kind, state.events.len() + 1);
        state.events.push_back(event);
        drop(state);

        self.available.notify_one();
        Ok(())
    }

    /// Dequeue without blocking. `Ok(None)` when the queue is empty but open.
    pub fn try_dequeue(&self) -> Result<Option<TransformEvent>, TransformError> {
        let mut state = self.state.lock();
        match state.events.pop_front() {
            Some(event) => Ok(Some(event)),
            None if state.shut_down => Err(TransformError::ChannelClosed),
            None => Ok(None),
        }
    }

    /// Dequeue, blocking up to `timeout`. `Ok(None)` on timeout.
    pub fn wait_dequeue(&self, timeout: Duration) -> Result<Option<TransformEvent>, TransformError> {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.state.lock();
        loop {
            if let Some(event) = state.events.pop_front() {
                return Ok(Some(event));
            }
            if state.shut_down {
                return Err(TransformError::ChannelClosed);
            }
            match deadline {
                Some(deadline) => {
                    if self.available.wait_until(&mut state, deadline).timed_out() {
                        // One last look: an event may have raced the timeout.
                        return match state.events.pop_front() {
                            Some(event) => Ok(Some(event)),
                            None if state.shut_down => Err(TransformError::ChannelClosed),
                            None => Ok(None),
                        };
                    }
                }
                None => self.available.wait(&mut state),
            }
        }
    }

    /// Close the queue and wake every waiter. Idempotent.
    pub fn shutdown(&self) {
        let mut state = self.state.lock();
        if state.shut_down {
            return;
        }
        state.shut_down = true;
        drop(state);

        self.available.notify_all();
    }

    /// Drop every undelivered event.
    pub fn clear(&self) -> usize {
        let mut state = self.state.lock();
        let dropped = state.events.len();
        state.events.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.state.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().events.is_empty()
    }

    pub fn is_shut_down(&self) -> bool {
        self.state.lock().shut_down
    }
}
