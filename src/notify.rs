//! Fire-and-forget user notifications.

use serde::Serialize;

/// Severity of a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Error,
    Warning,
    Success,
    Info,
}

impl AlertLevel {
    /// CSS alert class used by the admin templates.
    pub fn as_str(self) -> &'static str {
        match self {
            AlertLevel::Error => "danger",
            AlertLevel::Warning => "warning",
            AlertLevel::Success => "success",
            AlertLevel::Info => "info",
        }
    }
}

/// Receives human-readable messages, typically shown as toasts.
pub trait NotificationSink {
    fn notify(&self, level: AlertLevel, message: &str);
}

impl<N: NotificationSink + ?Sized> NotificationSink for &N {
    fn notify(&self, level: AlertLevel, message: &str) {
        (**self).notify(level, message)
    }
}

/// Sink that writes notifications to the application log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, level: AlertLevel, message: &str) {
        match level {
            AlertLevel::Error => log::error!("{message}"),
            AlertLevel::Warning => log::warn!("{message}"),
            AlertLevel::Success | AlertLevel::Info => log::info!("{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_level_to_str_mappings() {
        assert_eq!(AlertLevel::Error.as_str(), "danger");
        assert_eq!(AlertLevel::Warning.as_str(), "warning");
        assert_eq!(AlertLevel::Success.as_str(), "success");
        assert_eq!(AlertLevel::Info.as_str(), "info");
    }
}
