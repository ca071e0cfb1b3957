// src/notify/mod.rs

//! Notification channel abstraction.
//!
//! The pipeline only requires [`Notifier::send_message`]; editing and
//! deletion are optional capabilities a channel may not have.

mod telegram;

pub use telegram::TelegramNotifier;

use async_trait::async_trait;
use thiserror::Error;

/// Channel-assigned identifier of a delivered message.
pub type MessageId = i64;

/// Errors raised by a notification channel.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Transport-level failure (connection, timeout, malformed response)
    #[error("channel transport failure: {0}")]
    Transport(String),

    /// The channel accepted the request but rejected the operation
    #[error("channel rejected request: {0}")]
    Rejected(String),

    /// The channel does not implement this capability
    #[error("operation not supported by this channel")]
    Unsupported,
}

/// A destination-addressed message channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a text message to a destination, returning the channel's
    /// identifier for the delivered message.
    async fn send_message(&self, dest: &str, text: &str)
    -> std::result::Result<MessageId, NotifyError>;

    /// Replace the text of a previously sent message.
    async fn edit_message(
        &self,
        _dest: &str,
        _message_id: MessageId,
        _text: &str,
    ) -> std::result::Result<(), NotifyError> {
        Err(NotifyError::Unsupported)
    }

    /// Remove a previously sent message.
    async fn delete_message(
        &self,
        _dest: &str,
        _message_id: MessageId,
    ) -> std::result::Result<(), NotifyError> {
        Err(NotifyError::Unsupported)
    }

    /// Whether [`Notifier::delete_message`] is implemented.
    fn supports_deletion(&self) -> bool {
        false
    }
}
