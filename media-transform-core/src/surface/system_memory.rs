use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::models::error::TransformError;
use crate::models::media_type::VideoFormat;
use crate::surface::handle::SurfaceMemory;
use crate::traits::video_device::VideoDevice;

/// Default row alignment, in bytes.
pub const DEFAULT_PITCH_ALIGNMENT: usize = 64;

/// Software [`VideoDevice`] backed by system memory.
///
/// Rows are padded to `pitch_alignment`, so copies into its surfaces
/// exercise the pitched path. The device can be marked lost to simulate
/// driver resets, and capped to simulate allocation failure.
#[derive(Debug)]
pub struct SystemMemoryDevice {
    name: String,
    pitch_alignment: usize,
    allocation_limit: Option<usize>,
    lost: AtomicBool,
    allocations: AtomicUsize,
}

impl SystemMemoryDevice {
    pub fn new() -> Self {
        Self::with_alignment("system memory", DEFAULT_PITCH_ALIGNMENT)
    }

    pub fn with_alignment(name: &str, pitch_alignment: usize) -> Self {
        Self {
            name: name.to_string(),
            pitch_alignment: pitch_alignment.max(1),
            allocation_limit: None,
            lost: AtomicBool::new(false),
            allocations: AtomicUsize::new(0),
        }
    }

    /// Fail with `OutOfMemory` after `limit` successful allocations.
    pub fn with_allocation_limit(mut self, limit: usize) -> Self {
        self.allocation_limit = Some(limit);
        self
    }

    /// Invalidate the device. Every later call fails with `DeviceLost`.
    pub fn lose(&self) {
        self.lost.store(true, Ordering::SeqCst);
    }

    pub fn is_lost(&self) -> bool {
        self.lost.load(Ordering::SeqCst)
    }

    /// Surfaces allocated over the device's lifetime.
    pub fn allocation_count(&self) -> usize {
        self.allocations.load(Ordering::SeqCst)
    }

    /// Row pitch this device uses for `format`.
    pub fn pitch_for(&self, format: &VideoFormat) -> usize {
        format.row_bytes().div_ceil(self.pitch_alignment) * self.pitch_alignment
    }
}

impl Default for SystemMemoryDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoDevice for SystemMemoryDevice {
    fn check(&self) -> Result<(), TransformError> {
        if self.is_lost() {
            return Err(TransformError::DeviceLost);
        }
        Ok(())
    }

    fn allocate_surface(&self, format: &VideoFormat) -> Result<SurfaceMemory, TransformError> {
        self.check()?;
        if let Some(limit) = self.allocation_limit {
            if self.allocation_count() >= limit {
                return Err(TransformError::OutOfMemory);
            }
        }
        self.allocations.fetch_add(1, Ordering::SeqCst);
        Ok(SurfaceMemory::new(self.pitch_for(format), format.rows()))
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}
