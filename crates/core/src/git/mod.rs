//! Git operations for the audit: local revision resolution and the GitHub API.

pub mod client;
pub mod github;

pub use client::{resolve_revision, GitClient};
pub use github::{GitHubClient, HostingService};
