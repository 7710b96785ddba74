//! Session-scoped activity log and notification center.

use std::sync::Mutex;

use clouddrive_core::models::{LogEntry, LogSeverity, Notification, NotificationSeverity};

/// Append-only log of pipeline events, in arrival order. Appends never fail
/// and never block callers beyond the lock.
#[derive(Debug, Default)]
pub struct ActivityLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(
        &self,
        service: impl Into<String>,
        message: impl Into<String>,
        severity: LogSeverity,
    ) {
        let entry = LogEntry::new(service, message, severity);
        tracing::debug!(
            service = %entry.service,
            severity = %entry.severity,
            "{}",
            entry.message
        );
        self.entries.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

/// User-facing notifications, newest first.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    notifications: Mutex<Vec<Notification>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
        severity: NotificationSeverity,
    ) {
        let notification = Notification::new(title, message, severity);
        self.notifications.lock().unwrap().insert(0, notification);
    }

    /// Snapshot, newest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn unread_count(&self) -> usize {
        self.notifications
            .lock()
            .unwrap()
            .iter()
            .filter(|n| !n.read)
            .count()
    }

    /// Flip every current notification to read. Idempotent; notifications
    /// pushed afterwards start unread as usual.
    pub fn mark_all_read(&self) {
        for notification in self.notifications.lock().unwrap().iter_mut() {
            notification.read = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_preserves_arrival_order() {
        let log = ActivityLog::new();
        log.append("API Gateway", "first", LogSeverity::Info);
        log.append("Orchestrator", "second", LogSeverity::Success);
        log.append("Orchestrator", "third", LogSeverity::Error);

        let messages: Vec<String> = log.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, ["first", "second", "third"]);
    }

    #[test]
    fn notifications_are_newest_first() {
        let center = NotificationCenter::new();
        center.push("Upload Started", "a", NotificationSeverity::Info);
        center.push("Processing Complete", "b", NotificationSeverity::Success);

        let titles: Vec<String> = center
            .notifications()
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(titles, ["Processing Complete", "Upload Started"]);
    }

    #[test]
    fn mark_all_read_is_idempotent_and_scoped_to_existing() {
        let center = NotificationCenter::new();
        center.push("Upload Started", "a", NotificationSeverity::Info);
        center.push("Safety Alert", "b", NotificationSeverity::Warning);
        assert_eq!(center.unread_count(), 2);

        center.mark_all_read();
        assert_eq!(center.unread_count(), 0);
        center.mark_all_read();
        assert_eq!(center.unread_count(), 0);

        center.push("Processing Complete", "c", NotificationSeverity::Success);
        assert_eq!(center.unread_count(), 1);
        assert!(!center.notifications()[0].read);
        assert!(center.notifications()[1].read);
    }
}
