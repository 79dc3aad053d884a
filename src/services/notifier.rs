use crate::models::{Notification, Severity};
use std::sync::Mutex;

/// Receives user-facing popups
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Shows notifications as log events on the `notification` target.
///
/// The console layer of the subscriber makes them visible to the user.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        let body = notification.body.replace('\n', ", ");
        match notification.severity {
            Severity::Info => {
                tracing::info!(target: "notification", "{}: {}", notification.title, body)
            }
            Severity::Error => {
                tracing::error!(target: "notification", "{}: {}", notification.title, body)
            }
        }
    }
}

/// Keeps every notification in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    received: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self) -> Vec<Notification> {
        self.received
            .lock()
            .map(|list| list.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        if let Ok(mut list) = self.received.lock() {
            list.push(notification.clone());
        }
    }
}
