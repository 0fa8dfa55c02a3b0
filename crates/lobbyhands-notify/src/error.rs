//! Notification errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    /// Channel accepted the request but reported failure.
    #[error("Notification delivery failed: {0}")]
    Delivery(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
