//! Telegram provider: send messages via the Bot API sendMessage method.

use crate::error::DeliveryError;
use crate::models::{DEFAULT_REQUEST_TIMEOUT_SECONDS, DEFAULT_TELEGRAM_API_BASE};
use crate::providers::NotificationSink;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Telegram notification sink (sendMessage). Token and chat_id come from the environment.
pub struct TelegramSink {
    api_base: String,
    token: String,
    chat_id: String,
    client: Arc<Client>,
}

impl TelegramSink {
    /// Create a sink talking to the public Bot API. Never log token.
    pub fn new(token: String, chat_id: String) -> Result<Self, reqwest::Error> {
        Self::with_api_base(
            DEFAULT_TELEGRAM_API_BASE,
            token,
            chat_id,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECONDS),
        )
    }

    /// Create a sink talking to a custom Bot API server. Every send is bounded by `timeout`.
    pub fn with_api_base(
        api_base: impl Into<String>,
        token: String,
        chat_id: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_base,
            token,
            chat_id,
            client: Arc::new(client),
        })
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token)
    }

    async fn send_message(&self, text: &str) -> Result<(), DeliveryError> {
        let body = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
        });
        let res = self
            .client
            .post(self.send_message_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.without_url()))?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected { status, body });
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for TelegramSink {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, text: &str) -> Result<(), DeliveryError> {
        self.send_message(text).await
    }
}
