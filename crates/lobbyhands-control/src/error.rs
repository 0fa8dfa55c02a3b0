//! Control errors.

use thiserror::Error;

/// Errors raised while wiring control inputs.
///
/// State transitions on [`crate::PauseController`] never fail; only the
/// plumbing around it can.
#[derive(Debug, Error)]
pub enum ControlError {
    /// Failed to set up signal handlers.
    #[error("Failed to set up signal handlers: {0}")]
    SignalSetup(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
