//! Capability predicate for media-type negotiation.
//!
//! Audio: 16-bit PCM stereo in, 32-bit float stereo out at the same rate.
//! Video: RGB32 / YUY2 / NV12 in, the identical type out.

use crate::models::config::TransformConfiguration;
use crate::models::error::TransformError;
use crate::models::media_type::{AudioFormat, AudioSubtype, MediaType, VideoFormat, VideoSubtype};

pub fn check_input_type(media_type: &MediaType, config: &TransformConfiguration) -> Result<(), TransformError> {
    match media_type {
        MediaType::Audio(format) => {
            if format.subtype != AudioSubtype::Pcm {
                return Err(TransformError::InvalidMediaType("input audio must be PCM".into()));
            }
            if format.bits_per_sample != 16 {
                return Err(TransformError::InvalidMediaType(format!(
                    "unsupported input bit depth: {}",
                    format.bits_per_sample
                )));
            }
            check_audio_common(format, config)
        }
        MediaType::Video(format) => check_video(format, config),
    }
}

/// Validate an output type against the current input type, if any.
pub fn check_output_type(
    media_type: &MediaType,
    input: Option<&MediaType>,
    config: &TransformConfiguration,
) -> Result<(), TransformError> {
    match media_type {
        MediaType::Audio(format) => {
            if format.subtype != AudioSubtype::Float || format.bits_per_sample != 32 {
                return Err(TransformError::InvalidMediaType(
                    "output audio must be 32-bit float".into(),
                ));
            }
            check_audio_common(format, config)?;
        }
        MediaType::Video(format) => check_video(format, config)?,
    }

    match input {
        Some(input) if !is_compatible(input, media_type) => Err(TransformError::InvalidMediaType(format!(
            "output type {:?} does not match input type {:?}",
            media_type, input
        ))),
        _ => Ok(()),
    }
}

/// Whether `output` is the type this transform produces from `input`.
pub fn is_compatible(input: &MediaType, output: &MediaType) -> bool {
    match (input, output) {
        (MediaType::Audio(input), MediaType::Audio(output)) => {
            input.sample_rate == output.sample_rate && input.channels == output.channels
        }
        (MediaType::Video(input), MediaType::Video(output)) => input == output,
        _ => false,
    }
}

/// The output type produced from `input`.
pub fn output_for_input(input: &MediaType) -> MediaType {
    match input {
        MediaType::Audio(format) => MediaType::Audio(AudioFormat::float_stereo(format.sample_rate)),
        MediaType::Video(format) => MediaType::Video(*format),
    }
}

/// The input type that produces `output`.
pub fn input_for_output(output: &MediaType) -> MediaType {
    match output {
        MediaType::Audio(format) => MediaType::Audio(AudioFormat::pcm16_stereo(format.sample_rate)),
        MediaType::Video(format) => MediaType::Video(*format),
    }
}

fn check_audio_common(format: &AudioFormat, config: &TransformConfiguration) -> Result<(), TransformError> {
    if format.channels != 2 {
        return Err(TransformError::InvalidMediaType(format!(
            "unsupported channel count: {}",
            format.channels
        )));
    }
    if !config.supported_sample_rates.contains(&format.sample_rate) {
        return Err(TransformError::InvalidMediaType(format!(
            "unsupported sample rate: {}",
            format.sample_rate
        )));
    }
    Ok(())
}

fn check_video(format: &VideoFormat, config: &TransformConfiguration) -> Result<(), TransformError> {
    if format.width == 0 || format.height == 0 {
        return Err(TransformError::InvalidMediaType("frame size must be non-zero".into()));
    }
    if format.width > config.max_frame_width || format.height > config.max_frame_height {
        return Err(TransformError::InvalidMediaType(format!(
            "frame size {}x{} exceeds {}x{}",
            format.width, format.height, config.max_frame_width, config.max_frame_height
        )));
    }
    let even_width = format.width % 2 == 0;
    let even_height = format.height % 2 == 0;
    match format.subtype {
        VideoSubtype::Nv12 if !(even_width && even_height) => Err(TransformError::InvalidMediaType(
            "NV12 requires even width and height".into(),
        )),
        VideoSubtype::Yuy2 if !even_width => {
            Err(TransformError::InvalidMediaType("YUY2 requires even width".into()))
        }
        _ => Ok(()),
    }
}
