use serde::{Deserialize, Serialize};

/// Audio sample encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioSubtype {
    Pcm,
    Float,
}

/// Uncompressed video frame layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoSubtype {
    /// 32 bits per pixel, single plane.
    Rgb32,
    /// Packed 4:2:2, 16 bits per pixel.
    Yuy2,
    /// Planar 4:2:0: a full-size luma plane followed by interleaved chroma at half height.
    Nv12,
}

/// Negotiated audio format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioFormat {
    pub subtype: AudioSubtype,
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl AudioFormat {
    /// Interleaved little-endian signed 16-bit stereo.
    pub fn pcm16_stereo(sample_rate: u32) -> Self {
        Self {
            subtype: AudioSubtype::Pcm,
            sample_rate,
            channels: 2,
            bits_per_sample: 16,
        }
    }

    /// Interleaved 32-bit float stereo.
    pub fn float_stereo(sample_rate: u32) -> Self {
        Self {
            subtype: AudioSubtype::Float,
            sample_rate,
            channels: 2,
            bits_per_sample: 32,
        }
    }

    /// Bytes per frame (all channels of one sample instant).
    pub fn block_align(&self) -> usize {
        self.channels as usize * self.bits_per_sample as usize / 8
    }

    pub fn avg_bytes_per_second(&self) -> usize {
        self.block_align() * self.sample_rate as usize
    }
}

/// Negotiated video frame geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoFormat {
    pub subtype: VideoSubtype,
    pub width: u32,
    pub height: u32,
}

impl VideoFormat {
    pub fn new(subtype: VideoSubtype, width: u32, height: u32) -> Self {
        Self { subtype, width, height }
    }

    /// Tightly packed bytes per row.
    pub fn row_bytes(&self) -> usize {
        let width = self.width as usize;
        match self.subtype {
            VideoSubtype::Rgb32 => width * 4,
            VideoSubtype::Yuy2 => width * 2,
            VideoSubtype::Nv12 => width,
        }
    }

    /// Number of rows in memory, chroma rows included.
    pub fn rows(&self) -> usize {
        let height = self.height as usize;
        match self.subtype {
            VideoSubtype::Nv12 => height + height / 2,
            VideoSubtype::Rgb32 | VideoSubtype::Yuy2 => height,
        }
    }

    /// Size of one frame with no row padding.
    pub fn packed_size(&self) -> usize {
        self.row_bytes() * self.rows()
    }
}

/// Format descriptor accepted on an input or output stream.
///
/// Values are replaced wholesale on renegotiation and never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "major", rename_all = "lowercase")]
pub enum MediaType {
    Audio(AudioFormat),
    Video(VideoFormat),
}

impl MediaType {
    pub fn as_audio(&self) -> Option<&AudioFormat> {
        match self {
            Self::Audio(format) => Some(format),
            Self::Video(_) => None,
        }
    }

    pub fn as_video(&self) -> Option<&VideoFormat> {
        match self {
            Self::Video(format) => Some(format),
            Self::Audio(_) => None,
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, Self::Video(_))
    }
}
