//! Error types for the IPR audit core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`AuditError`] enum unifies them all for callers that want a
//! single error type.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for an audit run.
///
/// A coverage violation is not an error: it is reported through
/// [`crate::models::AuditOutcome`].
#[derive(Debug, Error)]
pub enum AuditError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error(transparent)]
    Sheets(#[from] SheetsError),

    #[error(transparent)]
    Integrity(#[from] IntegrityError),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A required environment variable is not set.
    #[error("required environment variable '{var}' is not set (referenced by config field '{field}')")]
    EnvVarMissing { var: String, field: String },

    /// A required positional argument is missing or empty.
    #[error("required argument '{0}' is missing")]
    ArgumentMissing(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Git errors
// ---------------------------------------------------------------------------

/// Errors from local Git (git2) operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// The repository path does not exist or is not a git repo.
    #[error("git repository not found at '{0}'")]
    RepositoryNotFound(String),

    /// A ref (branch, tag, SHA) could not be resolved.
    #[error("git ref not found: {0}")]
    RefNotFound(String),

    /// A `git2` library error.
    #[error("git2 error: {0}")]
    Git2Error(#[from] git2::Error),
}

// ---------------------------------------------------------------------------
// GitHub API errors
// ---------------------------------------------------------------------------

/// Errors from GitHub REST API interactions.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// HTTP-level transport error (network, TLS, etc.).
    #[error("GitHub HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The API returned a non-success status code.
    #[error("GitHub API error (HTTP {status}): {url}")]
    ApiError { status: u16, url: String },

    /// Authentication token is missing or invalid.
    #[error("GitHub authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Rate limit exceeded.
    #[error("GitHub rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },

    /// JSON deserialization failure.
    #[error("GitHub response parse error: {0}")]
    ParseError(String),
}

// ---------------------------------------------------------------------------
// Sheets API errors
// ---------------------------------------------------------------------------

/// Errors from the spreadsheet values API.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// HTTP-level transport error.
    #[error("Sheets HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The API returned a non-success status code.
    #[error("Sheets API error (HTTP {status})")]
    ApiError { status: u16 },

    /// JSON deserialization failure.
    #[error("Sheets response parse error: {0}")]
    ParseError(String),
}

// ---------------------------------------------------------------------------
// Data-integrity errors
// ---------------------------------------------------------------------------

/// Remote data that does not have the shape the audit depends on.
#[derive(Debug, Error)]
pub enum IntegrityError {
    /// A commit is present in the history but carries no author attribution.
    #[error("missing author for commit {sha}")]
    MissingAuthor { sha: String },

    /// The spreadsheet payload has no `values` array.
    #[error("invalid sheet data: {0}")]
    InvalidSheetData(String),

    /// A team lookup returned no usable id.
    #[error("team '{slug}' lookup returned no id")]
    MissingTeamId { slug: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = IntegrityError::MissingAuthor {
            sha: "abc1234".into(),
        };
        assert_eq!(err.to_string(), "missing author for commit abc1234");

        let err = GitError::RepositoryNotFound("/tmp/repo".into());
        assert_eq!(err.to_string(), "git repository not found at '/tmp/repo'");

        let err = GitHubError::RateLimited {
            reset_at: "1700000000".into(),
        };
        assert!(err.to_string().contains("rate limit"));

        let err = ConfigError::EnvVarMissing {
            var: "GH_TOKEN".into(),
            field: "github.token_env".into(),
        };
        assert!(err.to_string().contains("GH_TOKEN"));
    }

    #[test]
    fn test_audit_error_from_subsystem() {
        let err: AuditError = ConfigError::ArgumentMissing("slug".into()).into();
        assert!(matches!(err, AuditError::Config(_)));

        let err: AuditError = IntegrityError::InvalidSheetData("no values".into()).into();
        assert!(matches!(err, AuditError::Integrity(_)));
        assert_eq!(err.to_string(), "invalid sheet data: no values");
    }
}
