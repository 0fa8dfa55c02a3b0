//! Vision collaborator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CollaboratorError;
use crate::types::{Position, Region};

/// Reading of the host avatar frame color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathFrameReading {
    /// Whether the death color was detected.
    pub detected: bool,
    /// Number of matching pixels behind the decision.
    pub matched_pixels: usize,
}

/// Black-box screen oracle.
///
/// Results are trusted as-is: the core never inspects pixels itself.
#[async_trait]
pub trait Vision: Send + Sync {
    /// Locate the infinite-mode action button, if it is on screen.
    async fn find_action_button(&self) -> Result<Option<Position>, CollaboratorError>;

    /// Check whether the host avatar frame shows the death color.
    async fn find_death_frame_color(&self) -> Result<DeathFrameReading, CollaboratorError>;

    /// Find text containing `pattern` inside `region`.
    async fn find_specific_text(
        &self,
        pattern: &str,
        region: Region,
    ) -> Result<Option<Position>, CollaboratorError>;

    /// Size of the primary screen, used to resolve percent regions.
    async fn screen_size(&self) -> Result<(u32, u32), CollaboratorError>;
}
