use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::error::TransformError;
use crate::models::media_type::VideoFormat;
use crate::models::sample::MemoryBuffer;
use crate::processing::row_copy;

/// Identity of one allocated surface. Never reused across pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId(Uuid);

impl SurfaceId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pixel storage returned by a [`VideoDevice`](crate::traits::video_device::VideoDevice).
///
/// Rows are `pitch` bytes apart; `pitch` may exceed the packed row width.
#[derive(Debug)]
pub struct SurfaceMemory {
    pitch: usize,
    rows: usize,
    data: Vec<u8>,
}

impl SurfaceMemory {
    /// Zero-filled storage of `rows` rows, `pitch` bytes each.
    pub fn new(pitch: usize, rows: usize) -> Self {
        Self {
            pitch,
            rows,
            data: vec![0; pitch * rows],
        }
    }

    pub fn pitch(&self) -> usize {
        self.pitch
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

/// A hardware-resident output buffer from the surface pool.
///
/// Cloning shares the same storage. The epoch records the device binding the
/// surface was allocated under; a surface whose epoch differs from the
/// transform's current one is stale and must not be touched.
#[derive(Debug, Clone)]
pub struct Surface {
    id: SurfaceId,
    epoch: u64,
    format: VideoFormat,
    memory: Arc<Mutex<SurfaceMemory>>,
}

impl Surface {
    pub(crate) fn new(format: VideoFormat, epoch: u64, memory: SurfaceMemory) -> Self {
        Self {
            id: SurfaceId::new(),
            epoch,
            format,
            memory: Arc::new(Mutex::new(memory)),
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn format(&self) -> VideoFormat {
        self.format
    }

    pub fn pitch(&self) -> usize {
        self.memory.lock().pitch
    }

    /// Direct access to the surface storage.
    ///
    /// Crate-private: the transform takes its own lock before any surface
    /// lock, so a guard held by a host across a transform call could deadlock.
    pub(crate) fn lock(&self) -> MutexGuard<'_, SurfaceMemory> {
        self.memory.lock()
    }

    /// Copy the storage out with its row padding, pitch included.
    pub fn to_pitched(&self) -> MemoryBuffer {
        let memory = self.memory.lock();
        MemoryBuffer::with_pitch(memory.data.clone(), memory.pitch)
    }

    /// Copy the frame out without row padding.
    pub fn to_packed(&self) -> Vec<u8> {
        let memory = self.memory.lock();
        let row_bytes = self.format.row_bytes();
        let rows = self.format.rows();
        let mut packed = vec![0u8; row_bytes * rows];
        // Geometry was validated at allocation time.
        if let Err(e) = row_copy::copy_rows(&mut packed, row_bytes, &memory.data, memory.pitch, row_bytes, rows) {
            log::warn!("surface {} readback failed: {}", self.id, e);
        }
        packed
    }

    /// Write a frame laid out with `src_pitch` into this surface, honoring the surface pitch.
    pub(crate) fn write_frame(&self, src: &[u8], src_pitch: usize) -> Result<(), TransformError> {
        let mut memory = self.memory.lock();
        let pitch = memory.pitch;
        row_copy::copy_rows(
            &mut memory.data,
            pitch,
            src,
            src_pitch,
            self.format.row_bytes(),
            self.format.rows(),
        )
    }

    /// Surface-to-surface copy, both pitches honored.
    pub(crate) fn copy_from(&self, source: &Surface) -> Result<(), TransformError> {
        if Arc::ptr_eq(&self.memory, &source.memory) {
            return Ok(());
        }
        let src = source.memory.lock();
        self.write_frame(&src.data, src.pitch)
    }

    pub(crate) fn fits(&self, format: &VideoFormat) -> bool {
        let memory = self.memory.lock();
        memory.pitch >= format.row_bytes() && memory.rows >= format.rows()
    }
}
