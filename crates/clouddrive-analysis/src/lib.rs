//! CloudDrive Analysis Provider Client
//!
//! Wraps a single remote capability — submit an image plus an instruction
//! schema, get back structured JSON — behind the [`AnalysisProvider`] trait,
//! with a Gemini-backed implementation. The transport surfaces faults as
//! typed errors; the default-on-fault policy lives with the orchestrator.

pub mod gemini;
pub mod provider;

pub use gemini::GeminiProvider;
pub use provider::{AnalysisProvider, ProviderError};
