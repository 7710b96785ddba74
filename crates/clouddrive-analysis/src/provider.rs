//! Provider seam for the four analysis kinds.
//!
//! Implementations perform exactly one attempt per call and return a typed
//! error on any fault. Callers decide what a fault means; the orchestrator
//! substitutes `AnalysisKind::fallback_fragment()` so one degraded kind
//! never blocks the other three.

use async_trait::async_trait;
use std::fmt::Debug;

use clouddrive_core::models::{AnalysisFragment, AnalysisKind};

/// Fault raised by an analysis provider call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request to analysis provider failed")]
    Transport(#[source] reqwest::Error),

    #[error("Analysis provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Analysis response did not match the {kind} schema: {message}")]
    Schema {
        kind: AnalysisKind,
        message: String,
    },
}

/// A remote analysis capability for a single kind.
///
/// `image` is non-empty raw image bytes; `content_type` is a supported
/// image MIME type (the orchestrator only constructs this call path for
/// images).
#[async_trait]
pub trait AnalysisProvider: Send + Sync + Debug {
    async fn analyze(
        &self,
        kind: AnalysisKind,
        image: &[u8],
        content_type: &str,
    ) -> Result<AnalysisFragment, ProviderError>;
}
