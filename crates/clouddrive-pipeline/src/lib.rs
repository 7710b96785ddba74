//! CloudDrive processing pipeline.
//!
//! Owns the session-scoped file record store, the activity log and
//! notification center, the mock login collaborator, and the analysis
//! orchestrator that drives uploaded images through the four-way
//! analysis fan-out.

pub mod activity;
pub mod orchestrator;
pub mod session;
pub mod state;
pub mod store;

pub use activity::{ActivityLog, NotificationCenter};
pub use orchestrator::Orchestrator;
pub use session::{login, UserProfile};
pub use state::AppState;
pub use store::{FileStore, ListOrder};
