//! User-facing notifications.
//!
//! Sessions report actionable problems (a worker that failed to load, a
//! rejected request) through a [`NotificationSink`]. How the message reaches
//! the user is up to the sink.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::event_bus::{AppEvent, EventBus, NotificationEvent};

/// Severity of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message.
    Info,
    /// Something went wrong but work can continue.
    Warning,
    /// An operation failed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Receiver of user-facing notifications
pub trait NotificationSink: Send + Sync {
    /// Show `message` to the user
    fn notify(&self, message: &str, severity: Severity);
}

/// Routes notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info => tracing::info!(target: "annokit::notify", "{}", message),
            Severity::Warning => tracing::warn!(target: "annokit::notify", "{}", message),
            Severity::Error => tracing::error!(target: "annokit::notify", "{}", message),
        }
    }
}

/// Publishes notifications onto an event bus
#[derive(Debug, Clone)]
pub struct EventBusNotifier {
    bus: Arc<EventBus>,
}

impl EventBusNotifier {
    /// Create a notifier publishing to `bus`
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }
}

impl NotificationSink for EventBusNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.bus.publish(AppEvent::Notification(NotificationEvent {
            message: message.to_string(),
            severity,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::EventFilter;
    use parking_lot::Mutex;

    #[test]
    fn test_event_bus_notifier_publishes() {
        let bus = Arc::new(EventBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        bus.subscribe(EventFilter::All, move |event| {
            if let AppEvent::Notification(n) = event {
                seen_clone.lock().push((n.message, n.severity));
            }
        });

        let notifier = EventBusNotifier::new(bus);
        notifier.notify("worker failed", Severity::Error);

        assert_eq!(
            seen.lock().as_slice(),
            &[("worker failed".to_string(), Severity::Error)]
        );
    }
}
