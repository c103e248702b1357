//! Notification sink: outbound delivery to a chat provider

use crate::error::DeliveryError;
use async_trait::async_trait;

/// Sink delivering text messages to one fixed chat destination (e.g. Telegram).
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Provider name for logging (e.g. "telegram").
    fn name(&self) -> &str;

    /// Send a text message to the destination.
    async fn send(&self, text: &str) -> Result<(), DeliveryError>;
}
