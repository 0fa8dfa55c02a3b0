//! Error types for the lobby run loop.

use lobbyhands_protocols::CollaboratorError;
use lobbyhands_store::StoreError;
use thiserror::Error;

/// Errors that can occur in the run loop.
#[derive(Debug, Error)]
pub enum RunLoopError {
    /// Persistent store failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Vision or actuator failure that escaped a step.
    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),
}

/// Result type for run loop operations.
pub type RunLoopResult<T> = Result<T, RunLoopError>;
