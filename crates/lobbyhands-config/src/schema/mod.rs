//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

mod schema_infra;
mod schema_lobby;

pub use schema_infra::*;
pub use schema_lobby::*;

/// Shared default helper used by submodules.
pub(crate) fn default_true() -> bool {
    true
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub lobby: LobbyConfig,

    #[serde(default)]
    pub infinite: InfiniteConfig,

    #[serde(default)]
    pub death_frame: DeathFrameConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub notify: NotifyConfig,

    #[serde(default)]
    pub supervisor: SupervisorConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub ocr: OcrConfig,
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
