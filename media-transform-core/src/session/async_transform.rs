use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::events::event_queue::EventQueue;
use crate::models::config::TransformConfiguration;
use crate::models::diagnostics::TransformDiagnostics;
use crate::models::error::TransformError;
use crate::models::event::TransformEvent;
use crate::models::media_type::{AudioFormat, MediaType};
use crate::models::message::TransformMessage;
use crate::models::sample::{MediaBuffer, MediaSample, OutputDataBuffer};
use crate::models::state::StreamState;
use crate::models::stream_info::{StreamCount, StreamInfo, StreamLimits};
use crate::processing::negotiation;
use crate::processing::sample_pipeline::SamplePipeline;
use crate::session::flow_control::{FlowControl, STREAM_ID};
use crate::surface::handle::Surface;
use crate::surface::manager::SurfaceManager;
use crate::traits::event_source::EventSource;
use crate::traits::shutdownable::Shutdownable;
use crate::traits::transform::Transform;
use crate::traits::video_device::VideoDevice;

/// Everything a host call may touch, guarded by one lock.
struct TransformInner {
    flow: FlowControl,
    pipeline: SamplePipeline,
    surfaces: SurfaceManager,
    input_type: Option<MediaType>,
    output_type: Option<MediaType>,
    /// The output type changed mid-stream and the host has not been told yet.
    format_change_pending: bool,
}

/// Asynchronous one-in / one-out media transform.
///
/// The host pushes work in and pulls results out only when told to, through
/// events read from the transform's [`EventSource`]:
/// ```text
/// host ──process_input──→ [convert] → [slot] ──process_output──→ host
///   ↑                                   │
///   └──── NeedInput / HaveOutput ←── [EventQueue]
/// ```
///
/// Audio is converted from 16-bit PCM stereo to 32-bit float. Video frames
/// pass through unchanged, delivered either into host memory or, once a
/// [`VideoDevice`] is bound, into surfaces from the transform's pool.
pub struct AsyncTransform {
    config: TransformConfiguration,
    inner: Mutex<TransformInner>,
    events: EventQueue,
}

impl AsyncTransform {
    pub fn new() -> Self {
        Self::build(TransformConfiguration::default())
    }

    pub fn with_config(config: TransformConfiguration) -> Result<Self, TransformError> {
        config.validate().map_err(TransformError::InvalidArgument)?;
        Ok(Self::build(config))
    }

    fn build(config: TransformConfiguration) -> Self {
        let inner = TransformInner {
            flow: FlowControl::new(),
            pipeline: SamplePipeline::new(),
            surfaces: SurfaceManager::new(config.surface_pool_size),
            input_type: None,
            output_type: None,
            format_change_pending: false,
        };
        Self {
            config,
            inner: Mutex::new(inner),
            events: EventQueue::new(),
        }
    }

    pub fn config(&self) -> &TransformConfiguration {
        &self.config
    }

    pub fn state(&self) -> StreamState {
        self.inner.lock().flow.state()
    }

    /// Bind a video device for surface output. Replaces any previous device;
    /// surfaces handed out under it become stale.
    pub fn bind_device(&self, device: Arc<dyn VideoDevice>) -> Result<(), TransformError> {
        let mut inner = self.inner.lock();
        inner.flow.ensure_live()?;
        inner.surfaces.bind(device)
    }

    /// Return to host-memory output.
    pub fn release_device(&self) -> Result<(), TransformError> {
        let mut inner = self.inner.lock();
        inner.flow.ensure_live()?;
        inner.surfaces.release_device();
        Ok(())
    }

    /// The host observed a device reset. Surface output fails with
    /// `DeviceLost` until a new device is bound.
    pub fn notify_device_lost(&self) -> Result<(), TransformError> {
        let mut inner = self.inner.lock();
        inner.flow.ensure_live()?;
        inner.surfaces.device_lost();
        Ok(())
    }

    /// Give a delivered surface back to the pool. Stale surfaces are ignored.
    pub fn release_surface(&self, surface: &Surface) -> bool {
        let mut inner = self.inner.lock();
        if inner.flow.state().is_terminal() {
            return false;
        }
        inner.surfaces.release_surface(surface.id(), surface.epoch())
    }

    pub fn diagnostics(&self) -> TransformDiagnostics {
        let inner = self.inner.lock();
        let flow = inner.flow.stats();
        let surfaces = inner.surfaces.stats();
        TransformDiagnostics {
            state: inner.flow.state(),
            input_type: inner.input_type,
            output_type: inner.output_type,
            input_pending: inner.flow.input_pending(),
            output_pending: inner.flow.output_pending(),
            inputs_processed: flow.inputs_accepted,
            outputs_delivered: flow.outputs_delivered,
            need_input_events: flow.need_input_raised,
            have_output_events: flow.have_output_raised,
            drains_completed: flow.drains_completed,
            markers_placed: flow.markers_placed,
            surfaces_allocated: surfaces.surfaces_allocated,
            pool_allocations: surfaces.pool_allocations,
            device_losses: surfaces.device_losses,
            device_epoch: inner.surfaces.epoch(),
            events_queued: self.events.len(),
            captured_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn diagnostics_json(&self) -> Result<String, TransformError> {
        self.diagnostics()
            .to_json()
            .map_err(|e| TransformError::InvalidState(format!("failed to serialize diagnostics: {}", e)))
    }

    fn check_stream(stream_id: u32) -> Result<(), TransformError> {
        if stream_id != STREAM_ID {
            return Err(TransformError::invalid_stream(stream_id));
        }
        Ok(())
    }

    /// Allocate the surface pool ahead of the first output, if surfaces apply.
    fn prepare_surfaces(&self) -> Result<(), TransformError> {
        let mut inner = self.inner.lock();
        inner.flow.ensure_live()?;
        if inner.output_type.is_some_and(|t| t.is_video()) {
            inner.surfaces.prepare()?;
        }
        Ok(())
    }
}

impl Default for AsyncTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AsyncTransform {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::warn!("shutdown on drop failed: {}", e);
        }
    }
}

impl Transform for AsyncTransform {
    fn start_stream(&self) -> Result<(), TransformError> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.flow.start_stream(&self.events)?;
        if inner.pipeline.clear() {
            log::debug!("discarded stale output on stream start");
        }
        Ok(())
    }

    fn end_of_stream(&self, stream_id: u32) -> Result<(), TransformError> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.flow.end_of_stream(stream_id)?;
        inner.pipeline.clear();
        Ok(())
    }

    fn drain(&self) -> Result<(), TransformError> {
        self.inner.lock().flow.drain(&self.events)
    }

    fn flush(&self) -> Result<(), TransformError> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.flow.flush()?;
        inner.pipeline.clear();
        Ok(())
    }

    fn place_marker(&self, token: u64) -> Result<(), TransformError> {
        self.inner.lock().flow.place_marker(&self.events, token)
    }

    fn process_message(&self, message: TransformMessage) -> Result<(), TransformError> {
        log::debug!("message {:?}", message);
        match message {
            TransformMessage::CommandFlush => self.flush(),
            TransformMessage::CommandDrain => self.drain(),
            TransformMessage::CommandMarker(token) => self.place_marker(token),
            TransformMessage::SetDevice(Some(device)) => self.bind_device(device),
            TransformMessage::SetDevice(None) => self.release_device(),
            TransformMessage::NotifyBeginStreaming => self.prepare_surfaces(),
            TransformMessage::NotifyEndStreaming => self.inner.lock().flow.ensure_live(),
            TransformMessage::NotifyStartOfStream => self.start_stream(),
            TransformMessage::NotifyEndOfStream(stream_id) => self.end_of_stream(stream_id),
        }
    }

    fn stream_limits(&self) -> StreamLimits {
        StreamLimits {
            input_minimum: 1,
            input_maximum: 1,
            output_minimum: 1,
            output_maximum: 1,
        }
    }

    fn stream_count(&self) -> StreamCount {
        StreamCount { inputs: 1, outputs: 1 }
    }

    fn input_stream_info(&self, stream_id: u32) -> Result<StreamInfo, TransformError> {
        Self::check_stream(stream_id)?;
        let inner = self.inner.lock();
        inner.flow.ensure_live()?;
        Ok(match inner.input_type {
            Some(MediaType::Audio(format)) => StreamInfo {
                sample_size: format.block_align(),
                fixed_sample_size: true,
                provides_samples: false,
                alignment: 1,
            },
            Some(MediaType::Video(format)) => StreamInfo {
                sample_size: format.packed_size(),
                fixed_sample_size: true,
                provides_samples: false,
                alignment: 1,
            },
            None => StreamInfo::default(),
        })
    }

    fn output_stream_info(&self, stream_id: u32) -> Result<StreamInfo, TransformError> {
        Self::check_stream(stream_id)?;
        let inner = self.inner.lock();
        inner.flow.ensure_live()?;
        Ok(match inner.output_type {
            Some(MediaType::Audio(format)) => StreamInfo {
                sample_size: format.block_align(),
                fixed_sample_size: true,
                provides_samples: true,
                alignment: 1,
            },
            Some(MediaType::Video(format)) => StreamInfo {
                sample_size: format.packed_size(),
                fixed_sample_size: true,
                provides_samples: inner.surfaces.is_active(),
                alignment: 1,
            },
            None => StreamInfo::default(),
        })
    }

    fn input_available_type(&self, stream_id: u32, index: usize) -> Result<MediaType, TransformError> {
        Self::check_stream(stream_id)?;
        let inner = self.inner.lock();
        inner.flow.ensure_live()?;
        match inner.output_type {
            Some(output) if index == 0 => Ok(negotiation::input_for_output(&output)),
            Some(_) => Err(TransformError::NoMoreTypes),
            None => self
                .config
                .supported_sample_rates
                .get(index)
                .map(|rate| MediaType::Audio(AudioFormat::pcm16_stereo(*rate)))
                .ok_or(TransformError::NoMoreTypes),
        }
    }

    fn output_available_type(&self, stream_id: u32, index: usize) -> Result<MediaType, TransformError> {
        Self::check_stream(stream_id)?;
        let inner = self.inner.lock();
        inner.flow.ensure_live()?;
        let input = inner.input_type.ok_or(TransformError::TypeNotSet)?;
        if index > 0 {
            return Err(TransformError::NoMoreTypes);
        }
        Ok(negotiation::output_for_input(&input))
    }

    fn check_input_type(&self, stream_id: u32, media_type: &MediaType) -> Result<(), TransformError> {
        Self::check_stream(stream_id)?;
        self.inner.lock().flow.ensure_live()?;
        negotiation::check_input_type(media_type, &self.config)
    }

    fn check_output_type(&self, stream_id: u32, media_type: &MediaType) -> Result<(), TransformError> {
        Self::check_stream(stream_id)?;
        let inner = self.inner.lock();
        inner.flow.ensure_live()?;
        negotiation::check_output_type(media_type, inner.input_type.as_ref(), &self.config)
    }

    fn set_input_type(&self, stream_id: u32, media_type: MediaType) -> Result<(), TransformError> {
        Self::check_stream(stream_id)?;
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.flow.ensure_live()?;
        negotiation::check_input_type(&media_type, &self.config)?;
        if inner.input_type == Some(media_type) {
            return Ok(());
        }

        // Mid-stream the transform follows the input and reports the new
        // output type on the first output produced under it.
        let state = inner.flow.state();
        if let (true, Some(previous)) = (state.is_streaming() || state.is_draining(), inner.output_type) {
            let next = negotiation::output_for_input(&media_type);
            inner.input_type = Some(media_type);
            inner.output_type = Some(next);
            if next != previous {
                inner.format_change_pending = true;
                log::debug!("format change mid-stream: {:?} -> {:?}", previous, next);
            }
            return Ok(());
        }

        if inner.pipeline.is_occupied() {
            return Err(TransformError::InvalidState(
                "cannot change the input type while output is pending".into(),
            ));
        }

        inner.input_type = Some(media_type);
        if let Some(output) = inner.output_type {
            if !negotiation::is_compatible(&media_type, &output) {
                log::debug!("output type {:?} no longer matches the input, clearing it", output);
                inner.output_type = None;
                inner.surfaces.set_format(None);
            }
        }
        log::debug!("input type set to {:?}", media_type);
        Ok(())
    }

    fn set_output_type(&self, stream_id: u32, media_type: MediaType) -> Result<(), TransformError> {
        Self::check_stream(stream_id)?;
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.flow.ensure_live()?;
        negotiation::check_output_type(&media_type, inner.input_type.as_ref(), &self.config)?;
        if inner.pipeline.is_occupied() && inner.output_type != Some(media_type) {
            return Err(TransformError::InvalidState(
                "cannot change the output type while output is pending".into(),
            ));
        }

        inner.output_type = Some(media_type);
        inner.surfaces.set_format(media_type.as_video().copied());
        log::debug!("output type set to {:?}", media_type);
        Ok(())
    }

    fn input_current_type(&self, stream_id: u32) -> Result<MediaType, TransformError> {
        Self::check_stream(stream_id)?;
        let inner = self.inner.lock();
        inner.flow.ensure_live()?;
        inner.input_type.ok_or(TransformError::TypeNotSet)
    }

    fn output_current_type(&self, stream_id: u32) -> Result<MediaType, TransformError> {
        Self::check_stream(stream_id)?;
        let inner = self.inner.lock();
        inner.flow.ensure_live()?;
        inner.output_type.ok_or(TransformError::TypeNotSet)
    }

    fn input_status(&self, stream_id: u32) -> Result<bool, TransformError> {
        Self::check_stream(stream_id)?;
        let inner = self.inner.lock();
        inner.flow.ensure_live()?;
        Ok(inner.flow.can_accept_input() && !inner.pipeline.is_occupied())
    }

    fn output_status(&self) -> Result<bool, TransformError> {
        let inner = self.inner.lock();
        inner.flow.ensure_live()?;
        Ok(inner.pipeline.is_occupied())
    }

    fn process_input(&self, stream_id: u32, sample: MediaSample) -> Result<(), TransformError> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.flow.ensure_live()?;
        Self::check_stream(stream_id)?;
        if !inner.flow.state().is_streaming() {
            return Err(TransformError::NotAccepting);
        }
        let (input_type, output_type) = match (inner.input_type, inner.output_type) {
            (Some(input), Some(output)) => (input, output),
            _ => return Err(TransformError::TypeNotSet),
        };
        if !inner.flow.can_accept_input() || inner.pipeline.is_occupied() {
            return Err(TransformError::NotAccepting);
        }

        let output = SamplePipeline::transform(&sample, &input_type, &output_type)?;
        inner.pipeline.fill_as(output, output_type)?;
        if let Err(e) = inner.flow.input_accepted(&self.events) {
            inner.pipeline.clear();
            return Err(e);
        }
        log::trace!("input accepted (time {:?})", sample.time);
        Ok(())
    }

    fn process_output(&self, output: &mut OutputDataBuffer) -> Result<(), TransformError> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.flow.ensure_live()?;
        Self::check_stream(output.stream_id)?;
        if !inner.pipeline.is_occupied() {
            return Err(TransformError::NeedMoreInput);
        }
        // Delivered under the type it was produced with, which may predate a format change.
        let output_type = inner.pipeline.buffered_type().ok_or(TransformError::TypeNotSet)?;

        if inner.format_change_pending && inner.output_type == Some(output_type) {
            if let Some(format) = output_type.as_video() {
                inner.surfaces.set_format(Some(*format));
                if inner.surfaces.is_active() {
                    inner.surfaces.prepare()?;
                }
            }
            inner.format_change_pending = false;
            log::debug!("output format changed to {:?}", output_type);
            return Err(TransformError::StreamChange);
        }

        // Surface output takes priority over any host buffer.
        let produced = if let (Some(format), true) = (output_type.as_video(), inner.surfaces.is_active()) {
            inner.surfaces.set_format(Some(*format));
            let surface = inner.surfaces.acquire()?;
            let copied = inner
                .surfaces
                .check_surface(&surface)
                .and_then(|()| inner.pipeline.deliver_to_surface(&surface));
            if let Err(e) = copied {
                inner.surfaces.release_surface(surface.id(), surface.epoch());
                return Err(e);
            }
            Some(MediaSample::from_surface(surface))
        } else {
            if let Some(sample) = output.sample.as_mut() {
                let dest = match &mut sample.buffer {
                    MediaBuffer::Memory(dest) => dest,
                    MediaBuffer::Surface(_) => {
                        return Err(TransformError::InvalidArgument(
                            "output sample must be a memory buffer".into(),
                        ))
                    }
                };
                inner.pipeline.deliver_to_memory(&output_type, dest)?;
            }
            None
        };

        if let Err(e) = inner.flow.output_delivered(&self.events) {
            if let Some(surface) = produced.as_ref().and_then(|s| s.buffer.as_surface()) {
                inner.surfaces.release_surface(surface.id(), surface.epoch());
            }
            return Err(e);
        }

        let buffered = inner.pipeline.take().ok_or(TransformError::NeedMoreInput)?;
        match produced {
            Some(mut sample) => {
                sample.copy_timing_from(&buffered);
                output.sample = Some(sample);
            }
            None => match output.sample.as_mut() {
                Some(sample) => sample.copy_timing_from(&buffered),
                None => output.sample = Some(buffered),
            },
        }
        log::trace!("output delivered");
        Ok(())
    }
}

impl EventSource for AsyncTransform {
    fn poll_event(&self) -> Result<Option<TransformEvent>, TransformError> {
        self.events.try_dequeue()
    }

    fn wait_event(&self, timeout: Duration) -> Result<Option<TransformEvent>, TransformError> {
        self.events.wait_dequeue(timeout)
    }
}

impl Shutdownable for AsyncTransform {
    fn shutdown(&self) -> Result<(), TransformError> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        if !inner.flow.shutdown() {
            return Ok(());
        }

        inner.pipeline.clear();
        inner.surfaces.shutdown();
        let dropped = self.events.clear();
        if let Err(e) = self.events.enqueue(TransformEvent::shutdown_complete()) {
            log::warn!("could not queue shutdown notification: {}", e);
        }
        self.events.shutdown();
        log::debug!("transform shut down, {} undelivered event(s) dropped", dropped);
        Ok(())
    }

    fn is_shut_down(&self) -> bool {
        self.inner.lock().flow.state().is_terminal()
    }
}
