//! Configuration module
//!
//! Env-driven configuration for the upload boundary, the pre-processing
//! checkpoints, and the Gemini analysis provider.

use std::env;

const MAX_FILE_SIZE_MB: usize = 10;
const PROVIDER_TIMEOUT_SECS: u64 = 120;
const CHECKPOINT_DELAY_MS: u64 = 500;
// 100 MiB demo quota so the storage meter moves visibly.
const STORAGE_QUOTA_BYTES: u64 = 100 * 1024 * 1024;

const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_ALLOWED_CONTENT_TYPES: &str = "image/jpeg,image/png,image/gif,image/webp";

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Gemini API key. May be absent; provider construction fails without it.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    /// Per-request timeout for provider calls.
    pub provider_timeout_secs: u64,
    pub max_file_size_bytes: u64,
    /// Image content types accepted at the upload boundary.
    pub allowed_content_types: Vec<String>,
    /// Simulated latency of each pre-processing checkpoint. 0 in tests.
    pub checkpoint_delay_ms: u64,
    pub storage_quota_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: DEFAULT_MODEL.to_string(),
            provider_timeout_secs: PROVIDER_TIMEOUT_SECS,
            max_file_size_bytes: (MAX_FILE_SIZE_MB * 1024 * 1024) as u64,
            allowed_content_types: DEFAULT_ALLOWED_CONTENT_TYPES
                .split(',')
                .map(|s| s.to_string())
                .collect(),
            checkpoint_delay_ms: CHECKPOINT_DELAY_MS,
            storage_quota_bytes: STORAGE_QUOTA_BYTES,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<u64>()
            .unwrap_or(MAX_FILE_SIZE_MB as u64);

        let allowed_content_types = env::var("ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|_| DEFAULT_ALLOWED_CONTENT_TYPES.to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let config = Config {
            gemini_api_key: env::var("GEMINI_API_KEY").ok().filter(|s| !s.is_empty()),
            gemini_model: env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            provider_timeout_secs: env::var("PROVIDER_TIMEOUT_SECS")
                .unwrap_or_else(|_| PROVIDER_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(PROVIDER_TIMEOUT_SECS),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            allowed_content_types,
            checkpoint_delay_ms: env::var("CHECKPOINT_DELAY_MS")
                .unwrap_or_else(|_| CHECKPOINT_DELAY_MS.to_string())
                .parse()
                .unwrap_or(CHECKPOINT_DELAY_MS),
            storage_quota_bytes: env::var("STORAGE_QUOTA_MB")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .map(|mb| mb * 1024 * 1024)
                .unwrap_or(STORAGE_QUOTA_BYTES),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.gemini_model.trim().is_empty() {
            return Err(anyhow::anyhow!("GEMINI_MODEL cannot be empty"));
        }

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }

        if self.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "ALLOWED_CONTENT_TYPES must list at least one image content type"
            ));
        }

        if let Some(key) = &self.gemini_api_key {
            // Catch obvious placeholders before the first provider call fails.
            if key == "your-api-key" || key.len() < 10 {
                return Err(anyhow::anyhow!(
                    "GEMINI_API_KEY appears to be invalid or a placeholder"
                ));
            }
        }

        Ok(())
    }

    /// Whether the upload boundary accepts this content type.
    pub fn accepts_content_type(&self, content_type: &str) -> bool {
        let normalized = content_type.trim().to_lowercase();
        self.allowed_content_types.contains(&normalized)
    }
}
