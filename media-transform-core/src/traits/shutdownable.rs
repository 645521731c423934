use crate::models::error::TransformError;

/// Terminal shutdown of a component.
pub trait Shutdownable: Send + Sync {
    /// Release every owned resource. Idempotent; later calls succeed trivially.
    fn shutdown(&self) -> Result<(), TransformError>;

    fn is_shut_down(&self) -> bool;
}
