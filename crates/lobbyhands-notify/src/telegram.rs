//! Telegram bot channel.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::channel::NotifyChannel;
use crate::error::NotifyError;
use crate::notification::Notification;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct TelegramChannel {
    bot_token: String,
    chat_id: String,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            client,
        }
    }

    fn url(&self) -> String {
        format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token)
    }

    fn payload(&self, notification: &Notification) -> serde_json::Value {
        serde_json::json!({
            "chat_id": self.chat_id,
            "text": notification.format_markdown(),
            "parse_mode": "Markdown"
        })
    }
}

#[async_trait]
impl NotifyChannel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(self.url())
            .json(&self.payload(notification))
            .send()
            .await?;

        if response.status().is_success() {
            debug!("Telegram notification sent");
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(NotifyError::Delivery(format!(
                "Telegram API returned {}: {}",
                status, body
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotifyLevel;

    #[test]
    fn test_url() {
        let channel = TelegramChannel::new("123:abc", "42");
        assert_eq!(
            channel.url(),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
        assert_eq!(channel.name(), "telegram");
    }

    #[test]
    fn test_payload() {
        let channel = TelegramChannel::new("123:abc", "42");
        let payload = channel.payload(&Notification::new("Paused", "now", NotifyLevel::Info));
        assert_eq!(payload["chat_id"], "42");
        assert_eq!(payload["parse_mode"], "Markdown");
        assert!(payload["text"].as_str().unwrap().contains("**Paused**"));
    }
}
