//! CloudDrive Core Library
//!
//! This crate provides the domain models, error types, configuration, and
//! telemetry setup shared across all CloudDrive components.

pub mod config;
pub mod error;
pub mod format;
pub mod models;
pub mod telemetry;

// Re-export commonly used types
pub use config::Config;
pub use error::AppError;
pub use format::format_bytes;
