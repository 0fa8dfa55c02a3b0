//! Notification channel trait.

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::error::NotifyError;
use crate::notification::{Notification, NotifyLevel};

#[async_trait]
pub trait NotifyChannel: Send + Sync {
    fn name(&self) -> &str;

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Writes notifications to the tracing log.
pub struct LogChannel;

#[async_trait]
impl NotifyChannel for LogChannel {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, n: &Notification) -> Result<(), NotifyError> {
        match n.level {
            NotifyLevel::Info => info!("[NOTIFY] {}: {}", n.title, n.message),
            NotifyLevel::Warning => warn!("[NOTIFY] {}: {}", n.title, n.message),
            NotifyLevel::Critical => error!("[NOTIFY] {}: {}", n.title, n.message),
        }
        Ok(())
    }
}
