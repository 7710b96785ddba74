//! Application state controller.
//!
//! Owns the store, activity log, notification center, session, and the
//! orchestrator handle; no ambient or static state anywhere. A presentation
//! layer talks to this struct and nothing else.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use uuid::Uuid;

use clouddrive_analysis::{AnalysisProvider, GeminiProvider};
use clouddrive_core::models::{LogSeverity, NotificationSeverity};
use clouddrive_core::{format_bytes, AppError, Config};

use crate::activity::{ActivityLog, NotificationCenter};
use crate::orchestrator::Orchestrator;
use crate::session::{self, UserProfile};
use crate::store::FileStore;

pub struct AppState {
    config: Config,
    store: Arc<FileStore>,
    activity: Arc<ActivityLog>,
    notifications: Arc<NotificationCenter>,
    orchestrator: Arc<Orchestrator>,
    current_user: Mutex<Option<UserProfile>>,
}

impl AppState {
    /// Assemble the controller around an explicit provider. Tests inject
    /// scripted providers here.
    pub fn new(config: Config, provider: Arc<dyn AnalysisProvider>) -> Self {
        let store = Arc::new(FileStore::new());
        let activity = Arc::new(ActivityLog::new());
        let notifications = Arc::new(NotificationCenter::new());
        let orchestrator = Arc::new(Orchestrator::new(
            Arc::clone(&store),
            Arc::clone(&activity),
            Arc::clone(&notifications),
            provider,
            config.clone(),
        ));
        Self {
            config,
            store,
            activity,
            notifications,
            orchestrator,
            current_user: Mutex::new(None),
        }
    }

    /// Assemble the controller with the Gemini provider from configuration.
    /// Fails when no API key is configured.
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        config.validate()?;
        let api_key = config
            .gemini_api_key
            .clone()
            .ok_or_else(|| AppError::InvalidInput("GEMINI_API_KEY is not set".to_string()))?;
        let provider = GeminiProvider::new(
            api_key,
            config.gemini_model.clone(),
            Duration::from_secs(config.provider_timeout_secs),
        )
        .map_err(|e| AppError::from(anyhow::Error::new(e)))?;
        Ok(Self::new(config, Arc::new(provider)))
    }

    /// Sign in, announce the session, and remember the profile.
    pub fn login(&self, email: &str, password: &str) -> Result<UserProfile, AppError> {
        let profile = session::login(email, password)?;
        self.activity.append(
            "Auth Service",
            format!("User {} logged in successfully", profile.email),
            LogSeverity::Success,
        );
        self.notifications.push(
            "Welcome Back",
            format!("Signed in as {}", profile.name),
            NotificationSeverity::Success,
        );
        *self.current_user.lock().unwrap() = Some(profile.clone());
        Ok(profile)
    }

    pub fn logout(&self) {
        *self.current_user.lock().unwrap() = None;
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.current_user.lock().unwrap().clone()
    }

    /// Accept an upload and start processing it in the background.
    pub fn upload(
        &self,
        name: impl Into<String>,
        content_type: impl Into<String>,
        content: bytes::Bytes,
    ) -> Result<Uuid, AppError> {
        let id = self.orchestrator.submit(name, content_type, content)?;
        self.orchestrator.spawn(id);
        Ok(id)
    }

    /// Storage used as a percentage of the configured quota.
    pub fn usage_percent(&self) -> f64 {
        if self.config.storage_quota_bytes == 0 {
            return 0.0;
        }
        (self.store.total_bytes() as f64 / self.config.storage_quota_bytes as f64) * 100.0
    }

    /// Storage meter text, e.g. "1.5 MB of 100 MB used".
    pub fn storage_summary(&self) -> String {
        format!(
            "{} of {} used",
            format_bytes(self.store.total_bytes()),
            format_bytes(self.config.storage_quota_bytes)
        )
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Arc<FileStore> {
        &self.store
    }

    pub fn activity(&self) -> &Arc<ActivityLog> {
        &self.activity
    }

    pub fn notifications(&self) -> &Arc<NotificationCenter> {
        &self.notifications
    }

    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.orchestrator
    }
}
