use futures::task::SpawnError;
use thiserror::Error;

/// Errors surfaced by [crate::AdapterController] operations.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The completion task for an adapter call could not be scheduled.
    #[error("failed to schedule adapter completion: {0}")]
    Spawn(#[from] SpawnError),
    /// A reconfiguration handle outlived the controller that issued it.
    #[error("adapter controller is no longer mounted")]
    Unmounted,
}
