use crate::models::error::TransformError;
use crate::models::media_type::{MediaType, VideoFormat};
use crate::models::sample::{MediaBuffer, MediaSample, MemoryBuffer};
use crate::processing::pcm_convert::{self, PCM16_STEREO_FRAME_BYTES};
use crate::processing::row_copy;
use crate::surface::handle::Surface;

/// Holds at most one processed unit awaiting retrieval.
///
/// Conversion itself ([`SamplePipeline::transform`]) touches no state, so a
/// failed conversion never disturbs the slot.
#[derive(Debug, Default)]
pub struct SamplePipeline {
    slot: Option<MediaSample>,
    /// Output type the buffered unit was produced under.
    slot_type: Option<MediaType>,
}

impl SamplePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_occupied(&self) -> bool {
        self.slot.is_some()
    }

    /// Discard the buffered unit. Returns whether one was present.
    pub fn clear(&mut self) -> bool {
        self.slot_type = None;
        self.slot.take().is_some()
    }

    pub fn fill(&mut self, sample: MediaSample) -> Result<(), TransformError> {
        if self.slot.is_some() {
            return Err(TransformError::NotAccepting);
        }
        self.slot = Some(sample);
        Ok(())
    }

    /// Buffer `sample`, recording the output type it was produced under.
    pub fn fill_as(&mut self, sample: MediaSample, media_type: MediaType) -> Result<(), TransformError> {
        self.fill(sample)?;
        self.slot_type = Some(media_type);
        Ok(())
    }

    pub fn buffered_type(&self) -> Option<MediaType> {
        self.slot_type
    }

    pub fn peek(&self) -> Option<&MediaSample> {
        self.slot.as_ref()
    }

    pub fn take(&mut self) -> Option<MediaSample> {
        self.slot_type = None;
        self.slot.take()
    }

    /// Produce the output unit for `input` under the negotiated types.
    ///
    /// Audio is converted from 16-bit PCM to float. Video memory frames are
    /// repacked without row padding; video surfaces are kept by reference
    /// and copied only on delivery.
    pub fn transform(
        input: &MediaSample,
        input_type: &MediaType,
        output_type: &MediaType,
    ) -> Result<MediaSample, TransformError> {
        let mut output = match (input_type, output_type, &input.buffer) {
            (MediaType::Audio(_), MediaType::Audio(_), MediaBuffer::Memory(buffer)) => {
                if buffer.len() % PCM16_STEREO_FRAME_BYTES != 0 {
                    return Err(TransformError::InvalidArgument(format!(
                        "audio buffer of {} bytes is not a whole number of frames",
                        buffer.len()
                    )));
                }
                let converted = pcm_convert::pcm16_stereo_to_float_bytes(buffer.data());
                MediaSample::from_bytes(converted)
            }
            (MediaType::Video(_), MediaType::Video(format), MediaBuffer::Memory(buffer)) => {
                let row_bytes = format.row_bytes();
                let mut packed = vec![0u8; format.packed_size()];
                row_copy::copy_rows(
                    &mut packed,
                    row_bytes,
                    buffer.data(),
                    buffer.pitch_or(row_bytes),
                    row_bytes,
                    format.rows(),
                )?;
                MediaSample::from_memory(MemoryBuffer::with_pitch(packed, row_bytes))
            }
            (MediaType::Video(_), MediaType::Video(format), MediaBuffer::Surface(surface)) => {
                if surface.format() != *format {
                    return Err(TransformError::InvalidArgument(format!(
                        "input surface format {:?} does not match {:?}",
                        surface.format(),
                        format
                    )));
                }
                MediaSample::from_surface(surface.clone())
            }
            (MediaType::Audio(_), _, MediaBuffer::Surface(_)) => {
                return Err(TransformError::InvalidArgument(
                    "audio input must be a memory buffer".into(),
                ))
            }
            _ => {
                return Err(TransformError::InvalidMediaType(
                    "input and output types are incompatible".into(),
                ))
            }
        };
        output.copy_timing_from(input);
        Ok(output)
    }

    /// Copy the buffered unit into a host-provided memory buffer.
    ///
    /// Frames honor the destination pitch, which may exceed the packed row
    /// width. The slot is left untouched; call [`take`](Self::take) once the
    /// delivery is committed.
    pub fn deliver_to_memory(&self, output_type: &MediaType, dest: &mut MemoryBuffer) -> Result<(), TransformError> {
        let buffered = self.slot.as_ref().ok_or(TransformError::NeedMoreInput)?;
        match (output_type, &buffered.buffer) {
            (MediaType::Audio(_), MediaBuffer::Memory(src)) => {
                if dest.len() < src.len() {
                    return Err(TransformError::InvalidArgument(format!(
                        "output buffer too small: {} < {}",
                        dest.len(),
                        src.len()
                    )));
                }
                dest.data_mut()[..src.len()].copy_from_slice(src.data());
                dest.truncate(src.len());
                Ok(())
            }
            (MediaType::Video(format), MediaBuffer::Memory(src)) => {
                copy_frame_into(format, dest, src.data(), src.pitch_or(format.row_bytes()))
            }
            (MediaType::Video(format), MediaBuffer::Surface(surface)) => {
                let memory = surface.lock();
                copy_frame_into(format, dest, memory.as_slice(), memory.pitch())
            }
            (MediaType::Audio(_), MediaBuffer::Surface(_)) => Err(TransformError::InvalidState(
                "audio output buffered in a surface".into(),
            )),
        }
    }

    /// Copy the buffered unit into a pool surface, row by row.
    pub fn deliver_to_surface(&self, surface: &Surface) -> Result<(), TransformError> {
        let buffered = self.slot.as_ref().ok_or(TransformError::NeedMoreInput)?;
        match &buffered.buffer {
            MediaBuffer::Memory(src) => surface.write_frame(src.data(), src.pitch_or(surface.format().row_bytes())),
            MediaBuffer::Surface(src) => surface.copy_from(src),
        }
    }
}

fn copy_frame_into(format: &VideoFormat, dest: &mut MemoryBuffer, src: &[u8], src_pitch: usize) -> Result<(), TransformError> {
    let row_bytes = format.row_bytes();
    let dest_pitch = dest.pitch_or(row_bytes);
    row_copy::copy_rows(dest.data_mut(), dest_pitch, src, src_pitch, row_bytes, format.rows())
}
