//! Analysis orchestrator.
//!
//! Drives an accepted upload through the processing state machine: three
//! sequential pre-processing checkpoints, then a four-way concurrent
//! analysis fan-out whose completions are serialized through a
//! single-consumer channel and merged one at a time. A provider fault
//! degrades exactly one analysis kind to its conservative default; only an
//! ingest fault fails the record.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use uuid::Uuid;

use clouddrive_analysis::AnalysisProvider;
use clouddrive_core::models::{
    AnalysisFragment, AnalysisKind, FileRecord, LogSeverity, NotificationSeverity,
    ProcessingState,
};
use clouddrive_core::{AppError, Config};

use crate::activity::{ActivityLog, NotificationCenter};
use crate::store::FileStore;

/// One analysis kind's outcome, delivered over the completion channel.
#[derive(Debug)]
struct Completion {
    fragment: AnalysisFragment,
    /// True when the fragment is a substituted default after a provider
    /// fault rather than a real result.
    degraded: bool,
}

pub struct Orchestrator {
    store: Arc<FileStore>,
    activity: Arc<ActivityLog>,
    notifications: Arc<NotificationCenter>,
    provider: Arc<dyn AnalysisProvider>,
    config: Config,
}

impl Orchestrator {
    pub fn new(
        store: Arc<FileStore>,
        activity: Arc<ActivityLog>,
        notifications: Arc<NotificationCenter>,
        provider: Arc<dyn AnalysisProvider>,
        config: Config,
    ) -> Self {
        Self {
            store,
            activity,
            notifications,
            provider,
            config,
        }
    }

    /// The upload boundary: validate, create the Pending record, and
    /// announce the upload. Processing is driven separately via
    /// [`Orchestrator::process`] (or [`Orchestrator::spawn`]).
    pub fn submit(
        &self,
        name: impl Into<String>,
        content_type: impl Into<String>,
        content: bytes::Bytes,
    ) -> Result<Uuid, AppError> {
        let name = name.into();
        let content_type = content_type.into();

        if !self.config.accepts_content_type(&content_type) {
            return Err(AppError::UnsupportedMediaType(content_type));
        }
        if content.len() as u64 > self.config.max_file_size_bytes {
            return Err(AppError::PayloadTooLarge {
                size_bytes: content.len() as u64,
                limit_bytes: self.config.max_file_size_bytes,
            });
        }

        let record = FileRecord::new(name.clone(), content_type, content);
        let id = record.id;
        tracing::info!(
            record_id = %id,
            name = %name,
            size_bytes = record.size_bytes,
            "Accepted upload"
        );
        self.store.create(record);

        self.activity.append(
            "API Gateway",
            format!("Received upload request for \"{}\"", name),
            LogSeverity::Success,
        );
        self.notifications.push(
            "Upload Started",
            format!("Uploading \"{}\"...", name),
            NotificationSeverity::Info,
        );

        Ok(id)
    }

    /// Drive a Pending record to a terminal state.
    ///
    /// The entire post-creation pipeline runs inside one fallible
    /// continuation; any error it surfaces, at any stage, maps to the
    /// Failed transition. Returns `Err` only when the id is unknown.
    #[tracing::instrument(skip(self), fields(record_id = %id))]
    pub async fn process(&self, id: Uuid) -> Result<(), AppError> {
        let record = self
            .store
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("No file record with id {}", id)))?;

        self.store.set_state(id, ProcessingState::Processing, 5);
        self.activity.append(
            "Orchestrator",
            "Initializing workflow: [Mod, Class, OCR, Meta]",
            LogSeverity::Info,
        );

        if let Err(err) = self.run_pipeline(&record).await {
            tracing::error!(record_id = %id, error = %err, "Workflow failed");
            self.store.set_state(id, ProcessingState::Failed, 0);
            self.activity.append(
                "Orchestrator",
                "Workflow failed critically.",
                LogSeverity::Error,
            );
            self.notifications.push(
                "Processing Failed",
                format!("Could not process \"{}\".", record.name),
                NotificationSeverity::Error,
            );
        }

        Ok(())
    }

    /// Fire-and-forget processing on the runtime, one task per record.
    /// Independent records interleave freely.
    pub fn spawn(self: &Arc<Self>, id: Uuid) -> tokio::task::JoinHandle<()> {
        let orchestrator = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = orchestrator.process(id).await {
                tracing::error!(record_id = %id, error = %err, "Processing task aborted");
            }
        })
    }

    async fn run_pipeline(&self, record: &FileRecord) -> Result<(), AppError> {
        let id = record.id;
        let checkpoint_delay = Duration::from_millis(self.config.checkpoint_delay_ms);

        tokio::time::sleep(checkpoint_delay).await;
        self.store.set_state(id, ProcessingState::Processing, 15);
        self.activity.append(
            "Media Service",
            "Transcoding completed. Thumbnail generated.",
            LogSeverity::Success,
        );

        // Ingest: read back the retained buffer. An empty buffer means the
        // upload's content was unreadable.
        if record.content.is_empty() {
            return Err(AppError::Ingest(format!(
                "Upload \"{}\" has no readable content",
                record.name
            )));
        }

        tokio::time::sleep(checkpoint_delay).await;
        self.store.set_state(id, ProcessingState::Processing, 25);
        self.activity.append(
            "Event Bus",
            "Broadcasting 'FILE_UPLOADED' event to topic 'image-analysis'",
            LogSeverity::Info,
        );

        // Fan out the four kinds; each task reports back over the channel
        // and the single consumer below merges completions one at a time.
        let (tx, mut rx) = mpsc::channel::<Completion>(AnalysisKind::ALL.len());
        for kind in AnalysisKind::ALL {
            let tx = tx.clone();
            let provider = Arc::clone(&self.provider);
            let content = record.content.clone();
            let content_type = record.content_type.clone();
            tokio::spawn(async move {
                let completion = match provider.analyze(kind, &content, &content_type).await {
                    Ok(fragment) => Completion {
                        fragment,
                        degraded: false,
                    },
                    Err(err) => {
                        tracing::warn!(
                            kind = %kind,
                            error = %err,
                            "Analysis call failed; substituting conservative default"
                        );
                        Completion {
                            fragment: kind.fallback_fragment(),
                            degraded: true,
                        }
                    }
                };
                // Receiver only drops once all four are consumed.
                let _ = tx.send(completion).await;
            });
        }
        drop(tx);

        while let Some(completion) = rx.recv().await {
            self.store.merge_analysis(id, &completion.fragment);
            self.record_completion(&record.name, &completion);
        }

        self.activity.append(
            "Database Service",
            format!("Persisting aggregated metadata for {}", id),
            LogSeverity::Info,
        );
        self.store.set_state(id, ProcessingState::Completed, 100);
        self.activity.append(
            "Orchestrator",
            "Workflow completed successfully.",
            LogSeverity::Success,
        );
        self.notifications.push(
            "Processing Complete",
            format!("\"{}\" analyzed successfully.", record.name),
            NotificationSeverity::Success,
        );

        Ok(())
    }

    /// Exactly one log entry per consumed completion; an unsafe moderation
    /// verdict additionally raises the safety notification immediately,
    /// before the remaining kinds finish.
    fn record_completion(&self, file_name: &str, completion: &Completion) {
        if completion.degraded {
            tracing::debug!(
                kind = %completion.fragment.kind(),
                "Merged substituted default fragment"
            );
        }
        match &completion.fragment {
            AnalysisFragment::Moderation {
                is_safe,
                safety_reason,
            } => {
                if !is_safe {
                    let reason = safety_reason.as_deref().unwrap_or("Unspecified");
                    self.activity.append(
                        "Moderation Service",
                        format!("Content Flagged: {}", reason),
                        LogSeverity::Error,
                    );
                    self.notifications.push(
                        "Safety Alert",
                        format!("\"{}\" flagged as unsafe.", file_name),
                        NotificationSeverity::Warning,
                    );
                } else {
                    self.activity.append(
                        "Moderation Service",
                        "Content Approved.",
                        LogSeverity::Success,
                    );
                }
            }
            AnalysisFragment::Classification {
                suggested_folder, ..
            } => {
                self.activity.append(
                    "Classifier Service",
                    format!("Categorized as: {}", suggested_folder),
                    LogSeverity::Success,
                );
            }
            AnalysisFragment::Ocr { extracted_text } => {
                self.activity.append(
                    "OCR Service",
                    format!(
                        "Extraction complete. {} chars found.",
                        extracted_text.chars().count()
                    ),
                    LogSeverity::Success,
                );
            }
            AnalysisFragment::Metadata { .. } => {
                self.activity.append(
                    "Metadata Service",
                    "Visual description generated.",
                    LogSeverity::Success,
                );
            }
        }
    }
}
