//! Notification messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyLevel {
    Info,
    Warning,
    Critical,
}

impl std::fmt::Display for NotifyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotifyLevel::Info => write!(f, "INFO"),
            NotifyLevel::Warning => write!(f, "WARNING"),
            NotifyLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl NotifyLevel {
    pub fn emoji(&self) -> &'static str {
        match self {
            NotifyLevel::Info => "\u{2139}\u{fe0f}",
            NotifyLevel::Warning => "\u{26a0}\u{fe0f}",
            NotifyLevel::Critical => "\u{1f6a8}",
        }
    }
}

/// A message for the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub level: NotifyLevel,
    pub timestamp: DateTime<Utc>,
    pub details: Option<serde_json::Value>,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>, level: NotifyLevel) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            level,
            timestamp: Utc::now(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn operation_started(
        name: &str,
        detail: &serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self::new("Operation", name, NotifyLevel::Info)
            .with_details(serde_json::Value::Object(detail.clone()))
    }

    pub fn trigger_fired(entity: &str, threshold: u64, current_cycles: u64) -> Self {
        Self::new(
            "Trigger",
            format!(
                "Switching to {} at {} cycles (trigger {})",
                entity, current_cycles, threshold
            ),
            NotifyLevel::Info,
        )
        .with_details(serde_json::json!({
            "entity": entity,
            "threshold": threshold,
            "current_cycles": current_cycles,
        }))
    }

    pub fn restart(reason: &str) -> Self {
        Self::new("Restart", reason, NotifyLevel::Warning)
    }

    pub fn format_text(&self) -> String {
        format!(
            "[{}] {} - {}\n{}",
            self.level,
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.title,
            self.message
        )
    }

    pub fn format_markdown(&self) -> String {
        format!(
            "{} **{}** - {}\n\n{}",
            self.level.emoji(),
            self.title,
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.message
        )
    }
}
