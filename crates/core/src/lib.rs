//! IPR audit core library.
//!
//! This crate checks that every author of a repository revision is covered
//! by a signed contributor agreement: it collects commit authors from the
//! GitHub API, gathers the agreement sheet and the delegate and emeritus
//! teams, and reports the authors no source covers.

pub mod audit;
pub mod config;
pub mod errors;
pub mod git;
pub mod identity;
pub mod models;
pub mod paginate;
pub mod sheets;

// Re-exports for convenience.
pub use audit::Auditor;
pub use config::AuditConfig;
pub use git::GitHubClient;
pub use models::{AuditOutcome, AuditReport, AuditRequest};
pub use sheets::SheetsClient;
