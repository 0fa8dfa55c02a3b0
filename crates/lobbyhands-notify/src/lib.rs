//! # LobbyHands Notify
//!
//! Operator notifications. Delivery is best-effort: failures are logged and
//! never reach the caller.

pub mod channel;
pub mod error;
pub mod notification;
pub mod notifier;
pub mod telegram;

pub use channel::{LogChannel, NotifyChannel};
pub use error::NotifyError;
pub use notification::{Notification, NotifyLevel};
pub use notifier::{Notifier, NotifyHandle};
pub use telegram::TelegramChannel;
