use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

use super::analysis::AnalysisResult;

/// Media kind, classified from the upload's content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Document,
}

impl MediaKind {
    /// Classify a MIME content type by its top-level prefix.
    /// Anything that is not image/video/audio is treated as a document.
    pub fn from_content_type(content_type: &str) -> Self {
        let prefix = content_type
            .split('/')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match prefix.as_str() {
            "image" => MediaKind::Image,
            "video" => MediaKind::Video,
            "audio" => MediaKind::Audio,
            _ => MediaKind::Document,
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Document => write!(f, "document"),
        }
    }
}

/// Lifecycle state of an uploaded file record.
///
/// `Completed` and `Failed` are terminal; no further transitions are
/// permitted once either is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingState {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ProcessingState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessingState::Completed | ProcessingState::Failed)
    }
}

impl Display for ProcessingState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ProcessingState::Pending => write!(f, "pending"),
            ProcessingState::Processing => write!(f, "processing"),
            ProcessingState::Completed => write!(f, "completed"),
            ProcessingState::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for ProcessingState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ProcessingState::Pending),
            "processing" => Ok(ProcessingState::Processing),
            "completed" => Ok(ProcessingState::Completed),
            "failed" => Ok(ProcessingState::Failed),
            _ => Err(anyhow::anyhow!("Invalid processing state: {}", s)),
        }
    }
}

/// An uploaded file record held in the session-scoped store.
///
/// `id`, `name`, `size_bytes`, `kind`, `content_type`, `content`, and
/// `uploaded_at` are immutable after creation. `state`, `progress`, and
/// `analysis` are mutated only through the store's patch operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: Uuid,
    pub name: String,
    pub kind: MediaKind,
    pub content_type: String,
    pub size_bytes: u64,
    /// Raw upload bytes, retained in memory for the lifetime of the record.
    #[serde(skip)]
    pub content: Bytes,
    pub uploaded_at: DateTime<Utc>,
    pub state: ProcessingState,
    /// 0-100; monotonically non-decreasing while Processing, 100 on
    /// Completed, forced to 0 on Failed.
    pub progress: u8,
    pub analysis: Option<AnalysisResult>,
}

impl FileRecord {
    /// Build a fresh Pending record for an accepted upload.
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, content: Bytes) -> Self {
        let content_type = content_type.into();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind: MediaKind::from_content_type(&content_type),
            size_bytes: content.len() as u64,
            content_type,
            content,
            uploaded_at: Utc::now(),
            state: ProcessingState::Pending,
            progress: 0,
            analysis: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_kind_from_content_type() {
        assert_eq!(MediaKind::from_content_type("image/jpeg"), MediaKind::Image);
        assert_eq!(MediaKind::from_content_type("IMAGE/PNG"), MediaKind::Image);
        assert_eq!(MediaKind::from_content_type("video/mp4"), MediaKind::Video);
        assert_eq!(MediaKind::from_content_type("audio/mpeg"), MediaKind::Audio);
        assert_eq!(
            MediaKind::from_content_type("application/pdf"),
            MediaKind::Document
        );
        assert_eq!(MediaKind::from_content_type(""), MediaKind::Document);
    }

    #[test]
    fn processing_state_terminal() {
        assert!(!ProcessingState::Pending.is_terminal());
        assert!(!ProcessingState::Processing.is_terminal());
        assert!(ProcessingState::Completed.is_terminal());
        assert!(ProcessingState::Failed.is_terminal());
    }

    #[test]
    fn processing_state_round_trip() {
        for state in [
            ProcessingState::Pending,
            ProcessingState::Processing,
            ProcessingState::Completed,
            ProcessingState::Failed,
        ] {
            assert_eq!(state.to_string().parse::<ProcessingState>().unwrap(), state);
        }
        assert!("invalid_state".parse::<ProcessingState>().is_err());
    }

    #[test]
    fn new_record_starts_pending() {
        let record = FileRecord::new("cat.jpg", "image/jpeg", Bytes::from_static(b"\xff\xd8"));
        assert_eq!(record.state, ProcessingState::Pending);
        assert_eq!(record.progress, 0);
        assert_eq!(record.kind, MediaKind::Image);
        assert_eq!(record.size_bytes, 2);
        assert!(record.analysis.is_none());
    }
}
