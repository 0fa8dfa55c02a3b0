//! Fan-out to every configured channel.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::channel::{LogChannel, NotifyChannel};
use crate::error::NotifyError;
use crate::notification::Notification;
use crate::telegram::TelegramChannel;

/// Queued notifications before new ones are dropped.
const QUEUE_DEPTH: usize = 64;

pub struct Notifier {
    channels: Vec<Box<dyn NotifyChannel>>,
}

impl Notifier {
    /// A notifier with only the log channel.
    pub fn new() -> Self {
        Self {
            channels: vec![Box::new(LogChannel)],
        }
    }

    /// Log channel plus Telegram when credentials are given.
    pub fn with_telegram(telegram: Option<(&str, &str)>) -> Self {
        let mut notifier = Self::new();
        if let Some((token, chat_id)) = telegram {
            info!("Adding Telegram notification channel");
            notifier.add_channel(Box::new(TelegramChannel::new(token, chat_id)));
        }
        notifier
    }

    /// Only the given channels, no log channel.
    pub fn from_channels(channels: Vec<Box<dyn NotifyChannel>>) -> Self {
        Self { channels }
    }

    pub fn add_channel(&mut self, channel: Box<dyn NotifyChannel>) {
        self.channels.push(channel);
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    /// Send to all channels, returning the failures.
    pub async fn send(&self, notification: &Notification) -> Vec<NotifyError> {
        let mut errors = Vec::new();
        for channel in &self.channels {
            if let Err(e) = channel.send(notification).await {
                error!("Failed to notify via {}: {}", channel.name(), e);
                errors.push(e);
            }
        }
        errors
    }

    /// Move the notifier onto a background task.
    pub fn spawn(self) -> (NotifyHandle, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<Notification>(QUEUE_DEPTH);
        let task = tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                self.send(&notification).await;
            }
        });
        (NotifyHandle { tx }, task)
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-blocking sender into a spawned [`Notifier`].
#[derive(Clone)]
pub struct NotifyHandle {
    tx: mpsc::Sender<Notification>,
}

impl NotifyHandle {
    /// Queue a notification. Drops it with a warning if the queue is full
    /// or the notifier has stopped.
    pub fn post(&self, notification: Notification) {
        if let Err(e) = self.tx.try_send(notification) {
            warn!("Notification dropped: {}", e);
        }
    }

    /// A handle whose notifications go nowhere.
    pub fn disconnected() -> Self {
        let (tx, _) = mpsc::channel(1);
        Self { tx }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use crate::notification::NotifyLevel;

    #[derive(Default, Clone)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    #[async_trait]
    impl NotifyChannel for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        async fn send(&self, n: &Notification) -> Result<(), NotifyError> {
            self.0.lock().push(n.title.clone());
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl NotifyChannel for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn send(&self, _n: &Notification) -> Result<(), NotifyError> {
            Err(NotifyError::Delivery("offline".to_string()))
        }
    }

    #[test]
    fn test_default_has_log_channel() {
        assert_eq!(Notifier::new().channel_names(), vec!["log"]);
    }

    #[test]
    fn test_with_telegram() {
        let notifier = Notifier::with_telegram(Some(("123:abc", "42")));
        assert_eq!(notifier.channel_names(), vec!["log", "telegram"]);
        assert_eq!(Notifier::with_telegram(None).channel_names(), vec!["log"]);
    }

    #[tokio::test]
    async fn test_send_continues_past_failures() {
        let recorder = Recorder::default();
        let notifier =
            Notifier::from_channels(vec![Box::new(Failing), Box::new(recorder.clone())]);

        let errors = notifier
            .send(&Notification::new("Paused", "", NotifyLevel::Info))
            .await;

        assert_eq!(errors.len(), 1);
        assert_eq!(recorder.0.lock().as_slice(), ["Paused"]);
    }

    #[tokio::test]
    async fn test_spawned_handle_delivers() {
        let recorder = Recorder::default();
        let (handle, task) = Notifier::from_channels(vec![Box::new(recorder.clone())]).spawn();

        handle.post(Notification::restart("lobby timeout"));
        handle.post(Notification::trigger_fired("Wolf", 30, 30));
        drop(handle);
        task.await.unwrap();

        assert_eq!(recorder.0.lock().as_slice(), ["Restart", "Trigger"]);
    }

    #[test]
    fn test_disconnected_handle_drops_silently() {
        let handle = NotifyHandle::disconnected();
        handle.post(Notification::restart("x"));
    }
}
