use crate::surface::handle::Surface;

/// System-memory buffer. 2D buffers carry a row pitch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryBuffer {
    data: Vec<u8>,
    pitch: Option<usize>,
}

impl MemoryBuffer {
    /// Linear buffer (audio, or a tightly packed frame).
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, pitch: None }
    }

    /// 2D buffer whose rows are `pitch` bytes apart.
    pub fn with_pitch(data: Vec<u8>, pitch: usize) -> Self {
        Self {
            data,
            pitch: Some(pitch),
        }
    }

    /// Zero-filled 2D destination of `rows` rows.
    pub fn zeroed_2d(pitch: usize, rows: usize) -> Self {
        Self::with_pitch(vec![0; pitch * rows], pitch)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.data.truncate(len);
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn pitch(&self) -> Option<usize> {
        self.pitch
    }

    /// Row pitch, falling back to the packed width for linear buffers.
    pub fn pitch_or(&self, row_bytes: usize) -> usize {
        self.pitch.unwrap_or(row_bytes)
    }
}

/// Storage behind a media sample.
#[derive(Debug, Clone)]
pub enum MediaBuffer {
    Memory(MemoryBuffer),
    Surface(Surface),
}

impl MediaBuffer {
    pub fn as_memory(&self) -> Option<&MemoryBuffer> {
        match self {
            Self::Memory(buffer) => Some(buffer),
            Self::Surface(_) => None,
        }
    }

    pub fn as_surface(&self) -> Option<&Surface> {
        match self {
            Self::Surface(surface) => Some(surface),
            Self::Memory(_) => None,
        }
    }
}

/// One unit of media data with optional timing (100 ns units).
#[derive(Debug, Clone)]
pub struct MediaSample {
    pub buffer: MediaBuffer,
    pub time: Option<i64>,
    pub duration: Option<i64>,
}

impl MediaSample {
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self::new(MediaBuffer::Memory(MemoryBuffer::new(data)))
    }

    pub fn from_memory(buffer: MemoryBuffer) -> Self {
        Self::new(MediaBuffer::Memory(buffer))
    }

    pub fn from_surface(surface: Surface) -> Self {
        Self::new(MediaBuffer::Surface(surface))
    }

    pub fn new(buffer: MediaBuffer) -> Self {
        Self {
            buffer,
            time: None,
            duration: None,
        }
    }

    pub fn with_time(mut self, time: i64, duration: i64) -> Self {
        self.time = Some(time);
        self.duration = Some(duration);
        self
    }

    /// Carry timing over from `other`.
    pub(crate) fn copy_timing_from(&mut self, other: &MediaSample) {
        self.time = other.time;
        self.duration = other.duration;
    }
}

/// Destination descriptor passed to `process_output`.
///
/// Leave `sample` empty to receive the transform's own sample (converted
/// audio or a pool surface), or supply a memory buffer to have the frame
/// copied into it.
#[derive(Debug, Clone)]
pub struct OutputDataBuffer {
    pub stream_id: u32,
    pub sample: Option<MediaSample>,
}

impl OutputDataBuffer {
    pub fn new(stream_id: u32) -> Self {
        Self {
            stream_id,
            sample: None,
        }
    }

    pub fn with_sample(stream_id: u32, sample: MediaSample) -> Self {
        Self {
            stream_id,
            sample: Some(sample),
        }
    }

    pub fn take_sample(&mut self) -> Option<MediaSample> {
        self.sample.take()
    }
}
