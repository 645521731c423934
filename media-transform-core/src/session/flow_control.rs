use crate::events::event_queue::EventQueue;
use crate::models::error::TransformError;
use crate::models::event::TransformEvent;
use crate::models::state::StreamState;

/// Input credits the transform keeps outstanding while streaming.
pub const MAX_INPUT_PENDING: u32 = 1;

/// The only stream id this transform exposes.
pub const STREAM_ID: u32 = 0;

/// Event and transition counters reported through diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowStats {
    pub need_input_raised: u64,
    pub have_output_raised: u64,
    pub inputs_accepted: u64,
    pub outputs_delivered: u64,
    pub drains_completed: u64,
    pub markers_placed: u64,
}

/// Credit-based backpressure between the transform and its host.
///
/// Each NeedInput event grants the host one input submission and each
/// HaveOutput event one output retrieval; the pending counters track the
/// credits still outstanding. Every call that emits an event enqueues it
/// first and only moves a counter once the enqueue succeeded.
#[derive(Debug, Default)]
pub struct FlowControl {
    state: StreamState,
    input_pending: u32,
    output_pending: u32,
    stats: FlowStats,
}

impl FlowControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn input_pending(&self) -> u32 {
        self.input_pending
    }

    pub fn output_pending(&self) -> u32 {
        self.output_pending
    }

    pub fn stats(&self) -> FlowStats {
        self.stats
    }

    pub fn ensure_live(&self) -> Result<(), TransformError> {
        if self.state.is_terminal() {
            return Err(TransformError::Shutdown);
        }
        Ok(())
    }

    /// Whether the host currently holds an input credit the transform can honor.
    pub fn can_accept_input(&self) -> bool {
        self.state.is_streaming() && self.input_pending > 0
    }

    /// Reset credits and issue the first NeedInput. Transitions: → streaming.
    pub fn start_stream(&mut self, events: &EventQueue) -> Result<(), TransformError> {
        self.ensure_live()?;
        events.enqueue(TransformEvent::need_input(STREAM_ID))?;

        self.input_pending = 1;
        self.output_pending = 0;
        self.stats.need_input_raised += 1;
        self.state = StreamState::Streaming;
        log::debug!("stream started");
        Ok(())
    }

    /// Transitions: → idle. No event.
    pub fn end_of_stream(&mut self, stream_id: u32) -> Result<(), TransformError> {
        self.ensure_live()?;
        if stream_id != STREAM_ID {
            return Err(TransformError::invalid_stream(stream_id));
        }
        self.reset();
        log::debug!("end of stream");
        Ok(())
    }

    /// Stop accepting input. Completes at once if no output is outstanding,
    /// otherwise transitions to draining until the last output is delivered.
    pub fn drain(&mut self, events: &EventQueue) -> Result<(), TransformError> {
        self.ensure_live()?;
        if self.output_pending > 0 {
            self.input_pending = 0;
            self.state = StreamState::Draining;
            log::debug!("draining, {} output(s) outstanding", self.output_pending);
            return Ok(());
        }

        events.enqueue(TransformEvent::drain_complete(STREAM_ID))?;
        self.input_pending = 0;
        self.state = StreamState::Idle;
        self.stats.drains_completed += 1;
        log::debug!("drain complete");
        Ok(())
    }

    /// Drop every outstanding credit. Transitions: → idle. No event.
    pub fn flush(&mut self) -> Result<(), TransformError> {
        self.ensure_live()?;
        self.reset();
        log::debug!("flushed");
        Ok(())
    }

    pub fn raise_need_input(&mut self, events: &EventQueue) -> Result<(), TransformError> {
        self.ensure_live()?;
        events.enqueue(TransformEvent::need_input(STREAM_ID))?;
        self.input_pending += 1;
        self.stats.need_input_raised += 1;
        Ok(())
    }

    pub fn raise_have_output(&mut self, events: &EventQueue) -> Result<(), TransformError> {
        self.ensure_live()?;
        events.enqueue(TransformEvent::have_output(STREAM_ID))?;
        self.output_pending += 1;
        self.stats.have_output_raised += 1;
        Ok(())
    }

    /// An input was consumed and its output buffered: spend the input
    /// credit, announce the output and, while under capacity, ask for more.
    pub fn input_accepted(&mut self, events: &EventQueue) -> Result<(), TransformError> {
        if !self.can_accept_input() {
            return Err(TransformError::NotAccepting);
        }
        self.raise_have_output(events)?;
        self.input_pending -= 1;
        self.stats.inputs_accepted += 1;

        if self.input_pending < MAX_INPUT_PENDING {
            self.raise_need_input(events)?;
        }
        Ok(())
    }

    /// A buffered output reached the host.
    pub fn output_delivered(&mut self, events: &EventQueue) -> Result<(), TransformError> {
        self.ensure_live()?;
        let remaining = self.output_pending.saturating_sub(1);

        if self.state.is_draining() && remaining == 0 {
            events.enqueue(TransformEvent::drain_complete(STREAM_ID))?;
            self.state = StreamState::Idle;
            self.stats.drains_completed += 1;
            log::debug!("drain complete after last output");
        }
        self.output_pending = remaining;
        self.stats.outputs_delivered += 1;
        Ok(())
    }

    /// Queue a marker behind every event raised so far.
    ///
    /// Delivery is best effort: a failed enqueue is logged and swallowed.
    pub fn place_marker(&mut self, events: &EventQueue, token: u64) -> Result<(), TransformError> {
        self.ensure_live()?;
        match events.enqueue(TransformEvent::marker(STREAM_ID, token)) {
            Ok(()) => self.stats.markers_placed += 1,
            Err(e) => log::warn!("dropping marker {}: {}", token, e),
        }
        Ok(())
    }

    /// Transitions: any → shut down. Returns false if already shut down.
    pub fn shutdown(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.input_pending = 0;
        self.output_pending = 0;
        self.state = StreamState::ShutDown;
        true
    }

    fn reset(&mut self) {
        self.input_pending = 0;
        self.output_pending = 0;
        self.state = StreamState::Idle;
    }
}
