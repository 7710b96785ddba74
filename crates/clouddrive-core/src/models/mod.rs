pub mod activity;
pub mod analysis;
pub mod file;

pub use activity::{LogEntry, LogSeverity, Notification, NotificationSeverity};
pub use analysis::{AnalysisFragment, AnalysisKind, AnalysisResult};
pub use file::{FileRecord, MediaKind, ProcessingState};
