//! Storage, notification, supervision, logging and OCR settings.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

fn expand(path: &str) -> PathBuf {
    PathBuf::from(crate::ConfigLoader::expand_path(path))
}

/// Where durable state lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_counters_file")]
    pub counters_file: String,

    #[serde(default = "default_triggers_file")]
    pub triggers_file: String,

    #[serde(default = "default_stats_file")]
    pub stats_file: String,
}

fn default_data_dir() -> String {
    "~/.lobbyhands".to_string()
}

fn default_counters_file() -> String {
    "counters.json".to_string()
}

fn default_triggers_file() -> String {
    "triggers.json".to_string()
}

fn default_stats_file() -> String {
    "statistics.json".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            counters_file: default_counters_file(),
            triggers_file: default_triggers_file(),
            stats_file: default_stats_file(),
        }
    }
}

impl StorageConfig {
    pub fn data_dir(&self) -> PathBuf {
        expand(&self.data_dir)
    }

    pub fn counters_path(&self) -> PathBuf {
        self.data_dir().join(&self.counters_file)
    }

    pub fn triggers_path(&self) -> PathBuf {
        self.data_dir().join(&self.triggers_file)
    }

    pub fn stats_path(&self) -> PathBuf {
        self.data_dir().join(&self.stats_file)
    }
}

/// Notification sinks. The log sink is always on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub telegram_bot_token: Option<String>,

    #[serde(default)]
    pub telegram_chat_id: Option<String>,
}

impl NotifyConfig {
    /// Token and chat id, when both are set and non-empty.
    pub fn telegram(&self) -> Option<(&str, &str)> {
        match (&self.telegram_bot_token, &self.telegram_chat_id) {
            (Some(token), Some(chat)) if !token.is_empty() && !chat.is_empty() => {
                Some((token.as_str(), chat.as_str()))
            }
            _ => None,
        }
    }
}

/// Session restart policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorConfig {
    /// 0 means unlimited.
    #[serde(default)]
    pub max_restarts: u32,

    #[serde(default = "default_restart_delay")]
    pub restart_delay_secs: u64,
}

fn default_restart_delay() -> u64 {
    10
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            max_restarts: 0,
            restart_delay_secs: default_restart_delay(),
        }
    }
}

impl SupervisorConfig {
    pub fn restart_delay(&self) -> Duration {
        Duration::from_secs(self.restart_delay_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_dir")]
    pub dir: String,

    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "~/.lobbyhands/logs".to_string()
}

fn default_max_files() -> usize {
    7
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: default_log_dir(),
            max_files: default_max_files(),
        }
    }
}

pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl LoggingConfig {
    pub fn dir(&self) -> PathBuf {
        expand(&self.dir)
    }

    /// The configured level if it is a known one, otherwise `info`.
    pub fn filter_level(&self) -> String {
        let level = self.level.to_lowercase();
        if LOG_LEVELS.contains(&level.as_str()) {
            level
        } else {
            "info".to_string()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    #[serde(default = "default_tesseract_cmd")]
    pub tesseract_cmd: String,

    /// Words below this confidence are ignored.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
}

fn default_tesseract_cmd() -> String {
    "tesseract".to_string()
}

fn default_min_confidence() -> f32 {
    40.0
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_cmd: default_tesseract_cmd(),
            min_confidence: default_min_confidence(),
        }
    }
}
