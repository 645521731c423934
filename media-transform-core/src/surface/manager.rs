use std::sync::Arc;

use crate::models::error::TransformError;
use crate::models::media_type::VideoFormat;
use crate::surface::handle::{Surface, SurfaceId};
use crate::surface::pool::SurfacePool;
use crate::traits::video_device::VideoDevice;

/// The device currently bound and the epoch it was bound under.
struct DeviceBinding {
    device: Arc<dyn VideoDevice>,
    epoch: u64,
}

/// Counters reported through diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceStats {
    pub surfaces_allocated: u64,
    pub pool_allocations: u64,
    pub device_losses: u64,
}

/// Owns the output surface pool and the device binding it was allocated from.
///
/// The epoch increases on every bind, release and loss. Surfaces carry the
/// epoch they were allocated under, and every access compares it with the
/// current one, so a surface from an earlier binding is never reused.
///
/// Allocation is lazy: binding a device or changing geometry only tears the
/// old pool down, and the next [`acquire`](Self::acquire) allocates a fresh one.
pub struct SurfaceManager {
    pool_size: usize,
    binding: Option<DeviceBinding>,
    epoch: u64,
    lost: bool,
    format: Option<VideoFormat>,
    pool: Option<SurfacePool>,
    stats: SurfaceStats,
}

impl SurfaceManager {
    pub fn new(pool_size: usize) -> Self {
        Self {
            pool_size,
            binding: None,
            epoch: 0,
            lost: false,
            format: None,
            pool: None,
            stats: SurfaceStats::default(),
        }
    }

    /// Bind `device`, replacing any previous binding.
    ///
    /// Fails without side effects if the device is already invalid.
    pub fn bind(&mut self, device: Arc<dyn VideoDevice>) -> Result<(), TransformError> {
        device.check()?;

        self.release_pool();
        self.epoch += 1;
        log::debug!("bound {} at epoch {}", device.name(), self.epoch);
        self.binding = Some(DeviceBinding {
            device,
            epoch: self.epoch,
        });
        self.lost = false;
        Ok(())
    }

    /// Drop the binding and the pool. Outstanding surfaces become stale.
    pub fn release_device(&mut self) {
        if self.binding.is_none() && !self.lost {
            return;
        }
        self.release_pool();
        self.binding = None;
        self.lost = false;
        self.epoch += 1;
        log::debug!("device released, epoch now {}", self.epoch);
    }

    /// Invalidate the binding after the device was lost.
    ///
    /// Surface output fails with `DeviceLost` until the next successful
    /// [`bind`](Self::bind). Ignored when no device is bound.
    pub fn device_lost(&mut self) {
        if self.lost {
            return;
        }
        let name = match self.binding.as_ref() {
            Some(binding) => binding.device.name(),
            None => {
                log::debug!("device loss reported with no device bound, ignoring");
                return;
            }
        };
        self.release_pool();
        self.binding = None;
        self.lost = true;
        self.epoch += 1;
        self.stats.device_losses += 1;
        log::error!("{} lost, surfaces invalidated (epoch {})", name, self.epoch);
    }

    /// Set the output geometry. A change tears the pool down.
    pub fn set_format(&mut self, format: Option<VideoFormat>) {
        if self.format == format {
            return;
        }
        self.format = format;
        if self.pool.is_some() {
            log::debug!("output geometry changed to {:?}, releasing surface pool", format);
            self.release_pool();
        }
    }

    /// Allocate the pool now if a device and geometry are available.
    pub fn prepare(&mut self) -> Result<(), TransformError> {
        if self.binding.is_none() || self.format.is_none() {
            return Ok(());
        }
        self.ensure_pool().map(|_| ())
    }

    /// Take a free surface for the next output.
    pub fn acquire(&mut self) -> Result<Surface, TransformError> {
        let epoch = self.epoch;
        let surface = self.ensure_pool()?.acquire(epoch)?;
        log::trace!("acquired surface {} (epoch {})", surface.id(), epoch);
        Ok(surface)
    }

    /// Hand a surface back after a failed delivery, or after the host released it.
    ///
    /// Stale or unknown surfaces are ignored; returns whether an entry was freed.
    pub fn release_surface(&mut self, id: SurfaceId, epoch: u64) -> bool {
        if epoch != self.epoch {
            log::warn!("ignoring release of stale surface {} (epoch {} != {})", id, epoch, self.epoch);
            return false;
        }
        match self.pool.as_mut().map(|pool| pool.release(id)) {
            Some(true) => true,
            _ => {
                log::warn!("ignoring release of unknown surface {}", id);
                false
            }
        }
    }

    /// Fail with `DeviceLost` if `surface` belongs to an earlier binding.
    pub fn check_surface(&self, surface: &Surface) -> Result<(), TransformError> {
        if self.lost || surface.epoch() != self.epoch {
            return Err(TransformError::DeviceLost);
        }
        Ok(())
    }

    /// Output goes through surfaces (a device is bound, or was lost and not yet replaced).
    pub fn is_active(&self) -> bool {
        self.binding.is_some() || self.lost
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    pub fn is_lost(&self) -> bool {
        self.lost
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn format(&self) -> Option<VideoFormat> {
        self.format
    }

    pub fn pool(&self) -> Option<&SurfacePool> {
        self.pool.as_ref()
    }

    pub fn stats(&self) -> SurfaceStats {
        self.stats
    }

    /// Release everything; the manager stays unbound.
    pub fn shutdown(&mut self) {
        self.release_pool();
        if self.binding.take().is_some() || self.lost {
            self.epoch += 1;
        }
        self.lost = false;
    }

    fn ensure_pool(&mut self) -> Result<&mut SurfacePool, TransformError> {
        if self.lost {
            return Err(TransformError::DeviceLost);
        }
        let device = match self.binding.as_ref() {
            Some(binding) => {
                debug_assert_eq!(binding.epoch, self.epoch);
                Arc::clone(&binding.device)
            }
            None => return Err(TransformError::InvalidState("no video device bound".into())),
        };

        if let Err(e) = device.check() {
            if e == TransformError::DeviceLost {
                self.device_lost();
            }
            return Err(e);
        }

        let format = self.format.ok_or(TransformError::TypeNotSet)?;
        let reusable = matches!(&self.pool, Some(pool) if pool.format() == format && pool.epoch() == self.epoch);
        if !reusable {
            self.release_pool();
            let allocated = SurfacePool::allocate(device.as_ref(), format, self.epoch, self.pool_size);
            let pool = match allocated {
                Ok(pool) => pool,
                Err(TransformError::DeviceLost) => {
                    self.device_lost();
                    return Err(TransformError::DeviceLost);
                }
                Err(e) => return Err(e),
            };
            log::debug!(
                "allocated {} surfaces of {}x{} at epoch {}",
                pool.len(),
                format.width,
                format.height,
                self.epoch
            );
            self.stats.surfaces_allocated += pool.len() as u64;
            self.stats.pool_allocations += 1;
            self.pool = Some(pool);
        }

        self.pool
            .as_mut()
            .ok_or_else(|| TransformError::InvalidState("surface pool missing".into()))
    }

    fn release_pool(&mut self) {
        if let Some(pool) = self.pool.take() {
            log::trace!("released {} surfaces (epoch {})", pool.len(), pool.epoch());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::media_type::VideoSubtype;
    use crate::surface::system_memory::SystemMemoryDevice;

    fn format(width: u32, height: u32) -> VideoFormat {
        VideoFormat::new(VideoSubtype::Rgb32, width, height)
    }

    fn bound_manager() -> (SurfaceManager, Arc<SystemMemoryDevice>) {
        let device = Arc::new(SystemMemoryDevice::new());
        let mut manager = SurfaceManager::new(4);
        manager.bind(device.clone()).unwrap();
        manager.set_format(Some(format(16, 8)));
        (manager, device)
    }

    #[test]
    fn allocation_is_deferred_until_acquire() {
        let (mut manager, device) = bound_manager();
        assert!(manager.pool().is_none());
        assert_eq!(device.allocation_count(), 0);

        manager.acquire().unwrap();

        assert_eq!(manager.pool().unwrap().len(), 4);
        assert_eq!(device.allocation_count(), 4);
        assert_eq!(manager.stats().pool_allocations, 1);
    }

    #[test]
    fn bind_increments_epoch() {
        let (mut manager, _) = bound_manager();
        let first = manager.epoch();

        manager.bind(Arc::new(SystemMemoryDevice::new())).unwrap();

        assert!(manager.epoch() > first);
    }

    #[test]
    fn binding_a_lost_device_fails_without_side_effects() {
        let (mut manager, _) = bound_manager();
        let epoch = manager.epoch();
        let broken = Arc::new(SystemMemoryDevice::new());
        broken.lose();

        assert_eq!(manager.bind(broken).unwrap_err(), TransformError::DeviceLost);
        assert_eq!(manager.epoch(), epoch);
        assert!(manager.is_bound());
    }

    #[test]
    fn device_loss_detected_on_acquire() {
        let (mut manager, device) = bound_manager();
        let surface = manager.acquire().unwrap();

        device.lose();

        assert_eq!(manager.acquire().unwrap_err(), TransformError::DeviceLost);
        assert!(manager.is_lost());
        assert!(manager.is_active());
        assert!(manager.pool().is_none());
        assert_eq!(manager.check_surface(&surface), Err(TransformError::DeviceLost));
        assert_eq!(manager.stats().device_losses, 1);
    }

    #[test]
    fn rebind_after_loss_allocates_fresh_pool() {
        let (mut manager, device) = bound_manager();
        let old = manager.acquire().unwrap();
        let old_ids = manager.pool().unwrap().ids();

        device.lose();
        manager.device_lost();
        assert_eq!(manager.acquire().unwrap_err(), TransformError::DeviceLost);

        manager.bind(Arc::new(SystemMemoryDevice::new())).unwrap();
        let fresh = manager.acquire().unwrap();

        assert!(fresh.epoch() > old.epoch());
        assert!(manager.pool().unwrap().ids().iter().all(|id| !old_ids.contains(id)));
        assert!(!manager.release_surface(old.id(), old.epoch()));
    }

    #[test]
    fn released_surface_is_reused_and_foreign_ids_are_ignored() {
        let (mut manager, _) = bound_manager();
        let surface = manager.acquire().unwrap();
        let mut other = SurfaceManager::new(1);
        other.bind(Arc::new(SystemMemoryDevice::new())).unwrap();
        other.set_format(Some(format(16, 8)));
        let foreign = other.acquire().unwrap();

        assert!(manager.release_surface(surface.id(), surface.epoch()));
        assert_eq!(manager.pool().unwrap().free_count(), 4);
        assert!(!manager.release_surface(foreign.id(), manager.epoch()));
        assert!(!manager.release_surface(surface.id(), manager.epoch() + 1));
    }

    #[test]
    fn loss_without_binding_is_ignored() {
        let mut manager = SurfaceManager::new(4);
        let epoch = manager.epoch();

        manager.device_lost();

        assert!(!manager.is_lost());
        assert!(!manager.is_active());
        assert_eq!(manager.epoch(), epoch);
        assert_eq!(manager.stats().device_losses, 0);
    }

    #[test]
    fn geometry_change_reallocates() {
        let (mut manager, device) = bound_manager();
        manager.acquire().unwrap();

        manager.set_format(Some(format(32, 16)));
        assert!(manager.pool().is_none());

        let surface = manager.acquire().unwrap();
        assert_eq!(surface.format(), format(32, 16));
        assert_eq!(manager.pool().unwrap().format(), format(32, 16));
        assert_eq!(device.allocation_count(), 8);
    }

    #[test]
    fn same_geometry_keeps_pool() {
        let (mut manager, device) = bound_manager();
        manager.acquire().unwrap();

        manager.set_format(Some(format(16, 8)));
        manager.acquire().unwrap();

        assert_eq!(device.allocation_count(), 4);
    }

    #[test]
    fn release_returns_surface_to_pool() {
        let (mut manager, _) = bound_manager();
        let surfaces: Vec<_> = (0..4).map(|_| manager.acquire().unwrap()).collect();
        assert_eq!(manager.acquire().unwrap_err(), TransformError::NoFreeSurface);

        assert!(manager.release_surface(surfaces[2].id(), surfaces[2].epoch()));

        assert_eq!(manager.acquire().unwrap().id(), surfaces[2].id());
    }

    #[test]
    fn acquire_without_device_or_format() {
        let mut manager = SurfaceManager::new(4);
        assert!(matches!(manager.acquire(), Err(TransformError::InvalidState(_))));

        manager.bind(Arc::new(SystemMemoryDevice::new())).unwrap();
        assert_eq!(manager.acquire().unwrap_err(), TransformError::TypeNotSet);
    }

    #[test]
    fn release_device_returns_to_memory_mode() {
        let (mut manager, _) = bound_manager();
        let surface = manager.acquire().unwrap();

        manager.release_device();

        assert!(!manager.is_active());
        assert!(manager.check_surface(&surface).is_err());
    }

    #[test]
    fn prepare_allocates_eagerly() {
        let (mut manager, device) = bound_manager();

        manager.prepare().unwrap();

        assert_eq!(device.allocation_count(), 4);
    }

    #[test]
    fn failed_allocation_leaves_no_pool() {
        let device = Arc::new(SystemMemoryDevice::new().with_allocation_limit(2));
        let mut manager = SurfaceManager::new(4);
        manager.bind(device).unwrap();
        manager.set_format(Some(format(16, 8)));

        assert_eq!(manager.acquire().unwrap_err(), TransformError::OutOfMemory);
        assert!(manager.pool().is_none());
        assert!(!manager.is_lost());
    }
}
