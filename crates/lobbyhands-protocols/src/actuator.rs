//! Actuator collaborator.

use async_trait::async_trait;

use crate::error::CollaboratorError;

/// Keyboard and mouse input.
///
/// Every call is synchronous from the caller's point of view and must not be
/// interrupted half-way.
#[async_trait]
pub trait Actuator: Send + Sync {
    /// Press and release a single key (e.g. `"f1"`, `"enter"`).
    async fn press_key(&self, key: &str) -> Result<(), CollaboratorError>;

    /// Move the cursor to `(x, y)` and click `click_count` times.
    async fn move_and_click(&self, x: i32, y: i32, click_count: u32)
        -> Result<(), CollaboratorError>;

    /// Type a string of text.
    async fn type_text(&self, text: &str) -> Result<(), CollaboratorError>;
}
