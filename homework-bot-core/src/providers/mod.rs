//! Communication providers: notification sinks
//!
//! **Delivery failures**: `send_message` logs and swallows every sink error. The poll loop
//! reports its own failures through the same path, so a failing sink must never interrupt it.

mod sink;
mod telegram;

pub use sink::NotificationSink;
pub use telegram::TelegramSink;

/// Send `text` through `sink`, logging any failure. Returns whether delivery succeeded.
pub async fn send_message(sink: &dyn NotificationSink, text: &str) -> bool {
    match sink.send(text).await {
        Ok(()) => {
            tracing::debug!(provider = sink.name(), "Message sent");
            true
        }
        Err(e) => {
            tracing::error!(
                provider = sink.name(),
                error = %e,
                error_detail = ?e,
                "Failed to send message"
            );
            false
        }
    }
}
