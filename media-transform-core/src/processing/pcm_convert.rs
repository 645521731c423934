/// Bytes per interleaved 16-bit stereo frame.
pub const PCM16_STEREO_FRAME_BYTES: usize = 4;

/// Bytes per interleaved 32-bit float stereo frame.
pub const FLOAT_STEREO_FRAME_BYTES: usize = 8;

/// Number of whole stereo frames in a 16-bit PCM buffer.
pub fn pcm16_stereo_frames(input: &[u8]) -> usize {
    input.len() / PCM16_STEREO_FRAME_BYTES
}

/// Convert interleaved little-endian i16 stereo to interleaved f32 stereo.
///
/// Each sample becomes `i16 / 32768.0`, left then right, frames in source
/// order. Writes `frames * 8` bytes (f32, little-endian) into `output` and
/// returns the frame count. A trailing partial frame is ignored, as is any
/// frame that does not fit in `output`.
pub fn convert_pcm16_stereo_to_float(input: &[u8], output: &mut [u8]) -> usize {
    let frames = pcm16_stereo_frames(input).min(output.len() / FLOAT_STEREO_FRAME_BYTES);

    for (src, dst) in input
        .chunks_exact(PCM16_STEREO_FRAME_BYTES)
        .zip(output.chunks_exact_mut(FLOAT_STEREO_FRAME_BYTES))
        .take(frames)
    {
        let left = i16::from_le_bytes([src[0], src[1]]) as f32 / 32768.0;
        let right = i16::from_le_bytes([src[2], src[3]]) as f32 / 32768.0;
        dst[0..4].copy_from_slice(&left.to_le_bytes());
        dst[4..8].copy_from_slice(&right.to_le_bytes());
    }
    frames
}

/// Allocating form of [`convert_pcm16_stereo_to_float`].
pub fn pcm16_stereo_to_float_bytes(input: &[u8]) -> Vec<u8> {
    let mut output = vec![0u8; pcm16_stereo_frames(input) * FLOAT_STEREO_FRAME_BYTES];
    convert_pcm16_stereo_to_float(input, &mut output);
    output
}

/// Decode little-endian f32 bytes into samples.
pub fn float_bytes_to_samples(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

/// Encode i16 samples as little-endian PCM bytes.
pub fn samples_to_pcm16_bytes(samples: &[i16]) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * 2);
    for sample in samples {
        data.extend_from_slice(&sample.to_le_bytes());
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn converts_known_values() {
        let pcm = samples_to_pcm16_bytes(&[0, i16::MAX, i16::MIN, 16384]);

        let samples = float_bytes_to_samples(&pcm16_stereo_to_float_bytes(&pcm));

        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0], 0.0);
        assert_relative_eq!(samples[1], 32767.0 / 32768.0);
        assert_eq!(samples[2], -1.0);
        assert_relative_eq!(samples[3], 0.5);
    }

    #[test]
    fn n_frames_become_n_times_two_floats() {
        let source: Vec<i16> = (0..200).map(|i| (i * 317 - 30000) as i16).collect();
        let pcm = samples_to_pcm16_bytes(&source);

        let samples = float_bytes_to_samples(&pcm16_stereo_to_float_bytes(&pcm));

        assert_eq!(samples.len(), 100 * 2);
        for (converted, original) in samples.iter().zip(&source) {
            assert_relative_eq!(*converted, *original as f32 / 32768.0, epsilon = 1e-7);
        }
    }

    #[test]
    fn preserves_channel_order() {
        let pcm = samples_to_pcm16_bytes(&[-8192, 8192]);

        let samples = float_bytes_to_samples(&pcm16_stereo_to_float_bytes(&pcm));

        assert_relative_eq!(samples[0], -0.25);
        assert_relative_eq!(samples[1], 0.25);
    }

    #[test]
    fn ignores_trailing_partial_frame() {
        let mut pcm = samples_to_pcm16_bytes(&[100, 200]);
        pcm.push(0x7f);

        assert_eq!(pcm16_stereo_frames(&pcm), 1);
        assert_eq!(pcm16_stereo_to_float_bytes(&pcm).len(), 8);
    }

    #[test]
    fn stops_at_output_capacity() {
        let pcm = samples_to_pcm16_bytes(&[1, 2, 3, 4]);
        let mut output = [0u8; 8];

        assert_eq!(convert_pcm16_stereo_to_float(&pcm, &mut output), 1);
    }

    #[test]
    fn empty_input() {
        assert!(pcm16_stereo_to_float_bytes(&[]).is_empty());
    }
}
