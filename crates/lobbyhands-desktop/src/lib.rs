//! Desktop collaborators for LobbyHands.
//!
//! ## Actuator
//! - key presses, clicks and typing through `enigo`
//!
//! ## Vision
//! - action button and death frame located by color in `screenshots` captures
//! - chat text found with the `tesseract` CLI (TSV output)
//!
//! Every call runs on the blocking pool; input and capture APIs are
//! synchronous.

mod actuator;
mod color;
mod error;
mod input;
mod ocr;
mod screen;
mod vision;

pub use actuator::DesktopActuator;
pub use color::{count_color, locate_color, ColorMatch};
pub use error::DesktopError;
pub use input::InputController;
pub use ocr::{find_text, parse_tsv, TesseractOcr, TextBlock};
pub use screen::{capture_area, screen_size};
pub use vision::{ButtonSearch, DeathFrameSearch, DesktopVision};

use lobbyhands_protocols::CollaboratorError;

/// Run blocking code on the blocking pool.
pub(crate) async fn run_blocking<F, T>(f: F) -> Result<T, CollaboratorError>
where
    F: FnOnce() -> Result<T, DesktopError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CollaboratorError::Unavailable(e.to_string()))?
        .map_err(CollaboratorError::from)
}
