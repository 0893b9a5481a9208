//! Operator notifications.

use std::sync::{Mutex, PoisonError};

use tableau_provisioner_core::{FailedUser, Notification, NotificationLevel};

/// Sink for success/warning/error toasts. Fire-and-forget.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);

    fn success(&self, message: &str) {
        self.notify(Notification::success(message));
    }

    fn warn(&self, message: &str, failures: Vec<FailedUser>) {
        self.notify(Notification::warning(message, failures));
    }

    fn error(&self, message: &str) {
        self.notify(Notification::error(message));
    }
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => tracing::info!("{notification}"),
            NotificationLevel::Warning => tracing::warn!("{notification}"),
            NotificationLevel::Error => tracing::error!("{notification}"),
        }
    }
}

/// Buffers notifications so a request handler can return them.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl CollectingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything collected so far.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(
            &mut *self
                .notifications
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notification: Notification) {
        tracing::debug!(level = ?notification.level, message = %notification.message, "Notification");
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}
