//! Desktop errors.

use lobbyhands_protocols::CollaboratorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DesktopError {
    #[error("Input failed: {0}")]
    Input(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Capture failed: {0}")]
    Capture(String),

    #[error("No monitor found")]
    NoMonitor,

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DesktopError> for CollaboratorError {
    fn from(err: DesktopError) -> Self {
        match err {
            DesktopError::Input(_) | DesktopError::InvalidKey(_) => {
                CollaboratorError::Actuation(err.to_string())
            }
            DesktopError::Capture(_) | DesktopError::Ocr(_) => {
                CollaboratorError::Vision(err.to_string())
            }
            DesktopError::NoMonitor => CollaboratorError::Unavailable(err.to_string()),
            DesktopError::Io(e) => CollaboratorError::Io(e),
        }
    }
}
