use crate::models::error::TransformError;
use crate::models::media_type::VideoFormat;
use crate::surface::handle::SurfaceMemory;

/// Hardware device layer beneath the surface pool.
///
/// Implemented by the host. The transform only ever calls it with its own
/// lock held, so implementations need not serialize calls themselves.
pub trait VideoDevice: Send + Sync {
    /// Fails with [`TransformError::DeviceLost`] once the device has been
    /// invalidated. Called before every surface allocation and acquisition.
    fn check(&self) -> Result<(), TransformError>;

    /// Allocate storage for one surface of `format`.
    ///
    /// The returned pitch must be at least `format.row_bytes()` and the row
    /// count at least `format.rows()`.
    fn allocate_surface(&self, format: &VideoFormat) -> Result<SurfaceMemory, TransformError>;

    /// Human-readable name for logs.
    fn name(&self) -> String {
        "video device".into()
    }
}
