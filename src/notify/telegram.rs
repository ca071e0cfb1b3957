// src/notify/telegram.rs

//! Telegram Bot API notification channel.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{MessageId, Notifier, NotifyError};

const API_BASE: &str = "https://api.telegram.org";

/// Bot API response envelope.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: MessageId,
}

/// Notifier backed by the Telegram Bot HTTP API.
pub struct TelegramNotifier {
    http: Client,
    base: String,
}

impl TelegramNotifier {
    /// Create a notifier using the given HTTP client and bot token.
    pub fn new(http: Client, bot_token: &str) -> Self {
        Self {
            http,
            base: format!("{API_BASE}/bot{bot_token}"),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{method}", self.base)
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<T, NotifyError> {
        let response = self
            .http
            .post(self.endpoint(method))
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        if !envelope.ok {
            let reason = envelope
                .description
                .unwrap_or_else(|| format!("{method} failed without description"));
            return Err(NotifyError::Rejected(reason));
        }

        envelope
            .result
            .ok_or_else(|| NotifyError::Transport(format!("{method} returned an empty result")))
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_message(&self, dest: &str, text: &str) -> Result<MessageId, NotifyError> {
        let sent: SentMessage = self
            .call("sendMessage", json!({ "chat_id": dest, "text": text }))
            .await?;
        Ok(sent.message_id)
    }

    async fn edit_message(
        &self,
        dest: &str,
        message_id: MessageId,
        text: &str,
    ) -> Result<(), NotifyError> {
        // editMessageText returns the edited message object; only the
        // ok flag matters here.
        let _: serde_json::Value = self
            .call(
                "editMessageText",
                json!({ "chat_id": dest, "message_id": message_id, "text": text }),
            )
            .await?;
        Ok(())
    }

    async fn delete_message(&self, dest: &str, message_id: MessageId) -> Result<(), NotifyError> {
        let _: serde_json::Value = self
            .call(
                "deleteMessage",
                json!({ "chat_id": dest, "message_id": message_id }),
            )
            .await?;
        Ok(())
    }

    fn supports_deletion(&self) -> bool {
        true
    }
}
