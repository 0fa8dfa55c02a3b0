//! Lobby monitoring, infinite mode and death frame settings.

use std::time::Duration;

use lobbyhands_protocols::{PercentInsets, PercentRegion, Region, Rgb};
use serde::{Deserialize, Serialize};

use super::default_true;

/// Lobby session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LobbyConfig {
    /// Active-time budget of one lobby session.
    #[serde(default = "default_lobby_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,

    #[serde(default = "default_death_check_interval")]
    pub death_check_interval_secs: u64,

    /// Search the chat for the gold pattern every N ticks.
    #[serde(default = "default_gold_check_every")]
    pub gold_check_every_ticks: u32,

    #[serde(default = "default_gold_pattern")]
    pub gold_pattern: String,

    #[serde(default = "default_status_interval")]
    pub status_interval_secs: u64,

    #[serde(default = "default_chat_region")]
    pub chat_region: PercentRegion,

    /// Wait for the match accept button before monitoring.
    #[serde(default = "default_true")]
    pub wait_for_accept: bool,

    /// Active-time budget for finding the accept button.
    #[serde(default = "default_accept_timeout")]
    pub accept_timeout_secs: u64,

    /// Text of the accept button.
    #[serde(default = "default_accept_pattern")]
    pub accept_pattern: String,

    #[serde(default = "default_accept_poll")]
    pub accept_poll_ms: u64,
}

fn default_lobby_timeout() -> u64 {
    1800
}

fn default_tick_interval() -> u64 {
    1000
}

fn default_death_check_interval() -> u64 {
    5
}

fn default_gold_check_every() -> u32 {
    3
}

fn default_gold_pattern() -> String {
    "9999999".to_string()
}

fn default_status_interval() -> u64 {
    30
}

fn default_chat_region() -> PercentRegion {
    PercentRegion {
        left: 20.0,
        top: 35.0,
        width: 60.0,
        height: 40.0,
    }
}

fn default_accept_timeout() -> u64 {
    60
}

fn default_accept_pattern() -> String {
    "ACCEPT".to_string()
}

fn default_accept_poll() -> u64 {
    500
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_lobby_timeout(),
            tick_interval_ms: default_tick_interval(),
            death_check_interval_secs: default_death_check_interval(),
            gold_check_every_ticks: default_gold_check_every(),
            gold_pattern: default_gold_pattern(),
            status_interval_secs: default_status_interval(),
            chat_region: default_chat_region(),
            wait_for_accept: true,
            accept_timeout_secs: default_accept_timeout(),
            accept_pattern: default_accept_pattern(),
            accept_poll_ms: default_accept_poll(),
        }
    }
}

impl LobbyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn death_check_interval(&self) -> Duration {
        Duration::from_secs(self.death_check_interval_secs)
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.status_interval_secs)
    }

    pub fn accept_timeout(&self) -> Duration {
        Duration::from_secs(self.accept_timeout_secs)
    }

    pub fn accept_poll(&self) -> Duration {
        Duration::from_millis(self.accept_poll_ms)
    }
}

/// Infinite mode (enter/exit cycling) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfiniteConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_attempt_interval")]
    pub attempt_interval_secs: u64,

    /// Key that moves the camera to the button.
    #[serde(default = "default_camera_key")]
    pub camera_key: String,

    #[serde(default = "default_click_x")]
    pub click_x: i32,

    #[serde(default = "default_click_y")]
    pub click_y: i32,

    /// Key confirming an entry.
    #[serde(default = "default_confirm_key")]
    pub confirm_key: String,

    #[serde(default = "default_confirm_delay")]
    pub confirm_delay_ms: u64,

    #[serde(default = "default_button_color")]
    pub button_color: Rgb,

    #[serde(default = "default_color_tolerance")]
    pub color_tolerance: u8,

    #[serde(default = "default_search_region")]
    pub search_region: PercentInsets,

    /// Click the found button directly when it is farther than this from
    /// `(click_x, click_y)`.
    #[serde(default = "default_reposition_tolerance")]
    pub reposition_tolerance_px: i32,
}

fn default_attempt_interval() -> u64 {
    10
}

fn default_camera_key() -> String {
    "space".to_string()
}

fn default_click_x() -> i32 {
    960
}

fn default_click_y() -> i32 {
    540
}

fn default_confirm_key() -> String {
    "d".to_string()
}

fn default_confirm_delay() -> u64 {
    1000
}

fn default_button_color() -> Rgb {
    Rgb::new(255, 200, 0)
}

fn default_color_tolerance() -> u8 {
    30
}

fn default_search_region() -> PercentInsets {
    PercentInsets {
        top: 30.0,
        bottom: 30.0,
        left: 30.0,
        right: 30.0,
    }
}

fn default_reposition_tolerance() -> i32 {
    10
}

impl Default for InfiniteConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            attempt_interval_secs: default_attempt_interval(),
            camera_key: default_camera_key(),
            click_x: default_click_x(),
            click_y: default_click_y(),
            confirm_key: default_confirm_key(),
            confirm_delay_ms: default_confirm_delay(),
            button_color: default_button_color(),
            color_tolerance: default_color_tolerance(),
            search_region: default_search_region(),
            reposition_tolerance_px: default_reposition_tolerance(),
        }
    }
}

impl InfiniteConfig {
    pub fn attempt_interval(&self) -> Duration {
        Duration::from_secs(self.attempt_interval_secs)
    }

    pub fn confirm_delay(&self) -> Duration {
        Duration::from_millis(self.confirm_delay_ms)
    }
}

/// Host avatar frame check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeathFrameConfig {
    #[serde(default = "default_frame_region")]
    pub region: Region,

    #[serde(default = "default_frame_color")]
    pub color: Rgb,

    #[serde(default = "default_frame_tolerance")]
    pub tolerance: u8,

    /// Matching pixels required to call it a death frame.
    #[serde(default = "default_min_pixels")]
    pub min_pixels: usize,
}

fn default_frame_region() -> Region {
    Region::new(0, 0, 192, 324)
}

fn default_frame_color() -> Rgb {
    Rgb::new(255, 0, 0)
}

fn default_frame_tolerance() -> u8 {
    40
}

fn default_min_pixels() -> usize {
    50
}

impl Default for DeathFrameConfig {
    fn default() -> Self {
        Self {
            region: default_frame_region(),
            color: default_frame_color(),
            tolerance: default_frame_tolerance(),
            min_pixels: default_min_pixels(),
        }
    }
}
