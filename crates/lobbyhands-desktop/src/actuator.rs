//! [`Actuator`] backed by enigo.

use async_trait::async_trait;
use lobbyhands_protocols::{Actuator, CollaboratorError};
use tracing::debug;

use crate::input::InputController;
use crate::run_blocking;

/// Opens a fresh input connection per call.
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopActuator;

impl DesktopActuator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Actuator for DesktopActuator {
    async fn press_key(&self, key: &str) -> Result<(), CollaboratorError> {
        debug!(key, "Pressing key");
        let key = key.to_string();
        run_blocking(move || InputController::new()?.key_press(&key)).await
    }

    async fn move_and_click(
        &self,
        x: i32,
        y: i32,
        click_count: u32,
    ) -> Result<(), CollaboratorError> {
        debug!(x, y, click_count, "Clicking");
        run_blocking(move || InputController::new()?.move_and_click(x, y, click_count)).await
    }

    async fn type_text(&self, text: &str) -> Result<(), CollaboratorError> {
        debug!(len = text.len(), "Typing text");
        let text = text.to_string();
        run_blocking(move || InputController::new()?.type_text(&text)).await
    }
}
