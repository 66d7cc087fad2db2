use matchpulse_core::consumers::{Notification, NotificationSink};

/// Shows notifications by logging them.
pub struct LogSink;

impl NotificationSink for LogSink {
    fn deliver(&self, notification: &Notification) -> anyhow::Result<()> {
        tracing::info!(title = %notification.title, body = %notification.body, "Notification");
        Ok(())
    }
}
