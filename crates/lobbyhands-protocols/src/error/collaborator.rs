//! Collaborator call errors.

use thiserror::Error;

/// Failure raised by a vision or actuation collaborator.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("Vision failed: {0}")]
    Vision(String),

    #[error("Actuation failed: {0}")]
    Actuation(String),

    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CollaboratorError {
    /// Shorthand for a vision failure.
    pub fn vision(msg: impl Into<String>) -> Self {
        Self::Vision(msg.into())
    }

    /// Shorthand for an actuation failure.
    pub fn actuation(msg: impl Into<String>) -> Self {
        Self::Actuation(msg.into())
    }
}
