use crate::models::error::TransformError;
use crate::models::media_type::VideoFormat;
use crate::surface::handle::{Surface, SurfaceId};
use crate::traits::video_device::VideoDevice;

/// Ownership state of a pool entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Owned by the pool, available for the next output.
    Free,
    /// Handed to the host; returns to `Free` only on explicit release.
    InUse,
}

#[derive(Debug)]
struct PoolEntry {
    surface: Surface,
    state: EntryState,
}

/// Fixed-size set of surfaces allocated for one geometry under one epoch.
#[derive(Debug)]
pub struct SurfacePool {
    entries: Vec<PoolEntry>,
    format: VideoFormat,
    epoch: u64,
}

impl SurfacePool {
    /// Allocate `count` surfaces. All or nothing: a failure drops whatever
    /// was already allocated.
    pub fn allocate(
        device: &dyn VideoDevice,
        format: VideoFormat,
        epoch: u64,
        count: usize,
    ) -> Result<Self, TransformError> {
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            device.check()?;
            let memory = device.allocate_surface(&format)?;
            let surface = Surface::new(format, epoch, memory);
            if !surface.fits(&format) {
                return Err(TransformError::InvalidState(format!(
                    "device returned a surface too small for {}x{}",
                    format.width, format.height
                )));
            }
            entries.push(PoolEntry {
                surface,
                state: EntryState::Free,
            });
        }
        Ok(Self { entries, format, epoch })
    }

    /// Hand out a free surface. Its epoch must match `current_epoch`.
    pub fn acquire(&mut self, current_epoch: u64) -> Result<Surface, TransformError> {
        if self.epoch != current_epoch {
            return Err(TransformError::DeviceLost);
        }
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.state == EntryState::Free)
            .ok_or(TransformError::NoFreeSurface)?;
        if entry.surface.epoch() != current_epoch {
            return Err(TransformError::DeviceLost);
        }
        entry.state = EntryState::InUse;
        Ok(entry.surface.clone())
    }

    /// Return a surface to `Free`. False if it is not part of this pool.
    pub fn release(&mut self, id: SurfaceId) -> bool {
        match self.entries.iter_mut().find(|e| e.surface.id() == id) {
            Some(entry) => {
                entry.state = EntryState::Free;
                true
            }
            None => false,
        }
    }

    pub fn state_of(&self, id: SurfaceId) -> Option<EntryState> {
        self.entries.iter().find(|e| e.surface.id() == id).map(|e| e.state)
    }

    pub fn ids(&self) -> Vec<SurfaceId> {
        self.entries.iter().map(|e| e.surface.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn free_count(&self) -> usize {
        self.entries.iter().filter(|e| e.state == EntryState::Free).count()
    }

    pub fn format(&self) -> VideoFormat {
        self.format
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}
