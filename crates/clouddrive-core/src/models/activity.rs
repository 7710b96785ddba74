use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

/// Severity of an activity log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSeverity {
    Info,
    Success,
    Error,
}

impl Display for LogSeverity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            LogSeverity::Info => write!(f, "info"),
            LogSeverity::Success => write!(f, "success"),
            LogSeverity::Error => write!(f, "error"),
        }
    }
}

/// One append-only activity log entry. Entries are never mutated or removed;
/// ordering is arrival order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    /// Logical service name (e.g. "Orchestrator", "OCR Service").
    pub service: String,
    pub message: String,
    pub severity: LogSeverity,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(service: impl Into<String>, message: impl Into<String>, severity: LogSeverity) -> Self {
        Self {
            id: Uuid::new_v4(),
            service: service.into(),
            message: message.into(),
            severity,
            timestamp: Utc::now(),
        }
    }
}

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationSeverity {
    Info,
    Success,
    Warning,
    Error,
}

/// A toast-style notification with read/unread tracking. `read` defaults to
/// false and flips true only via the bulk mark-all-read operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub severity: NotificationSeverity,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

impl Notification {
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        severity: NotificationSeverity,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            message: message.into(),
            severity,
            timestamp: Utc::now(),
            read: false,
        }
    }
}
