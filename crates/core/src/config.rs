//! TOML-based configuration for the audit.
//!
//! Secrets are never stored in the file. The `*_env` fields name the
//! environment variables that hold them, and [`AuditConfig::resolve_env_vars`]
//! reads those variables at startup. Every field has a default, so running
//! without a config file audits against the standard agreement sheet and
//! teams.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::ConfigError;

/// GitHub caps `per_page` at this value.
pub const MAX_PAGE_SIZE: u32 = 100;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level audit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// GitHub API and team settings.
    #[serde(default)]
    pub github: GitHubConfig,

    /// Agreement spreadsheet settings.
    #[serde(default)]
    pub sheet: SheetConfig,

    /// Local checkout used to resolve revisions.
    #[serde(default)]
    pub git: GitConfig,

    /// Logins that are always treated as covered.
    #[serde(default = "default_exceptions")]
    pub exceptions: Vec<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            github: GitHubConfig::default(),
            sheet: SheetConfig::default(),
            git: GitConfig::default(),
            exceptions: default_exceptions(),
        }
    }
}

fn default_exceptions() -> Vec<String> {
    ["EricSL", "jaro-sevcik", "jkrems", "josephschorr", "sideshowbarker"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// GitHub
// ---------------------------------------------------------------------------

/// GitHub API and team configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API base URL (default `https://api.github.com`).
    #[serde(default = "default_github_api_url")]
    pub api_url: String,

    /// Organization owning the delegate and emeritus teams.
    #[serde(default = "default_org")]
    pub org: String,

    /// Slug of the delegates team.
    #[serde(default = "default_delegates_team")]
    pub delegates_team: String,

    /// Slug of the emeriti team.
    #[serde(default = "default_emeriti_team")]
    pub emeriti_team: String,

    /// Environment variable holding the GitHub access token.
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Items requested per page on paginated listings.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Resolved token (populated by `resolve_env_vars`).
    #[serde(skip)]
    pub token: Option<String>,
}

fn default_github_api_url() -> String {
    "https://api.github.com".into()
}
fn default_org() -> String {
    "tc39".into()
}
fn default_delegates_team() -> String {
    "delegates".into()
}
fn default_emeriti_team() -> String {
    "emeriti".into()
}
fn default_token_env() -> String {
    "GH_TOKEN".into()
}
fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_github_api_url(),
            org: default_org(),
            delegates_team: default_delegates_team(),
            emeriti_team: default_emeriti_team(),
            token_env: default_token_env(),
            page_size: default_page_size(),
            token: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Sheet
// ---------------------------------------------------------------------------

/// Agreement spreadsheet configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Sheets API base URL (default `https://sheets.googleapis.com`).
    #[serde(default = "default_sheets_api_url")]
    pub api_url: String,

    /// Spreadsheet id, as found in `docs.google.com/spreadsheets/d/<id>/edit`.
    #[serde(default = "default_spreadsheet_id")]
    pub spreadsheet_id: String,

    /// A1 range holding the signer column.
    #[serde(default = "default_range")]
    pub range: String,

    /// Environment variable holding the Sheets API key.
    #[serde(default = "default_key_env")]
    pub key_env: String,

    /// Resolved API key (populated by `resolve_env_vars`).
    #[serde(skip)]
    pub key: Option<String>,
}

fn default_sheets_api_url() -> String {
    "https://sheets.googleapis.com".into()
}
fn default_spreadsheet_id() -> String {
    "1if5bU0aV5MJ27GGKnRzyAozeKP-ILXYl5r3dzvkGFmg".into()
}
fn default_range() -> String {
    "Sheet1!A2:A".into()
}
fn default_key_env() -> String {
    "GOOGLE_API_KEY".into()
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            api_url: default_sheets_api_url(),
            spreadsheet_id: default_spreadsheet_id(),
            range: default_range(),
            key_env: default_key_env(),
            key: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Git
// ---------------------------------------------------------------------------

/// Local checkout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    /// Directory of the checkout used for `rev-parse` style resolution.
    #[serde(default = "default_workdir")]
    pub workdir: PathBuf,
}

fn default_workdir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            workdir: default_workdir(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading & resolving
// ---------------------------------------------------------------------------

impl AuditConfig {
    /// Load an [`AuditConfig`] from a TOML file at the given path.
    ///
    /// This does **not** resolve environment variables -- call
    /// [`resolve_env_vars`](Self::resolve_env_vars) afterwards.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: AuditConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Resolve the token and API key from the environment.
    ///
    /// Both secrets are required: an unset or empty variable fails with
    /// [`ConfigError::EnvVarMissing`]. The token is checked first.
    pub fn resolve_env_vars(&mut self) -> Result<(), ConfigError> {
        info!("resolving environment variable references in config");
        self.github.token = Some(resolve_required_env(
            &self.github.token_env,
            "github.token_env",
        )?);
        self.sheet.key = Some(resolve_required_env(&self.sheet.key_env, "sheet.key_env")?);
        debug!("environment variable resolution complete");
        Ok(())
    }

    /// Validate that all required fields are present and sane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.github.token.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::EnvVarMissing {
                var: self.github.token_env.clone(),
                field: "github.token_env".into(),
            });
        }
        if self.sheet.key.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::EnvVarMissing {
                var: self.sheet.key_env.clone(),
                field: "sheet.key_env".into(),
            });
        }
        if self.github.page_size == 0 || self.github.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidValue {
                field: "github.page_size".into(),
                detail: format!("page size must be between 1 and {}", MAX_PAGE_SIZE),
            });
        }
        for (field, value) in [
            ("github.org", &self.github.org),
            ("github.delegates_team", &self.github.delegates_team),
            ("github.emeriti_team", &self.github.emeriti_team),
            ("sheet.spreadsheet_id", &self.sheet.spreadsheet_id),
            ("sheet.range", &self.sheet.range),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.into(),
                    detail: "value must not be empty".into(),
                });
            }
        }
        Ok(())
    }

    /// Convenience: load (or default), resolve, and validate in one call.
    pub fn load_and_resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::load_from_file(p)?,
            None => Self::default(),
        };
        config.resolve_env_vars()?;
        config.validate()?;
        Ok(config)
    }
}

/// Read a required environment variable by name.
fn resolve_required_env(env_name: &str, field: &str) -> Result<String, ConfigError> {
    match std::env::var(env_name) {
        Ok(val) if !val.is_empty() => {
            debug!(field, env_name, "resolved env var");
            Ok(val)
        }
        Ok(_) => {
            warn!(field, env_name, "env var is set but empty");
            Err(ConfigError::EnvVarMissing {
                var: env_name.to_string(),
                field: field.to_string(),
            })
        }
        Err(_) => Err(ConfigError::EnvVarMissing {
            var: env_name.to_string(),
            field: field.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_toml() -> &'static str {
        r#"
exceptions = ["Octocat", "hubot"]

[github]
api_url = "https://ghe.example.com/api/v3"
org = "acme"
delegates_team = "members"
emeriti_team = "alumni"
token_env = "ACME_TOKEN"
page_size = 50

[sheet]
spreadsheet_id = "sheet-123"
range = "Signers!B2:B"
key_env = "ACME_SHEETS_KEY"

[git]
workdir = "/srv/checkout"
"#
    }

    fn resolved() -> AuditConfig {
        let mut config = AuditConfig::default();
        config.github.token = Some("ghp_abc".into());
        config.sheet.key = Some("sheet-key".into());
        config
    }

    #[test]
    fn test_parse_full_config() {
        let config: AuditConfig = toml::from_str(sample_toml()).expect("failed to parse toml");
        assert_eq!(config.github.org, "acme");
        assert_eq!(config.github.emeriti_team, "alumni");
        assert_eq!(config.github.page_size, 50);
        assert_eq!(config.sheet.range, "Signers!B2:B");
        assert_eq!(config.sheet.api_url, "https://sheets.googleapis.com");
        assert_eq!(config.git.workdir, PathBuf::from("/srv/checkout"));
        assert_eq!(config.exceptions, vec!["Octocat", "hubot"]);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ipr-check.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(sample_toml().as_bytes()).unwrap();

        let config = AuditConfig::load_from_file(&path).expect("load_from_file failed");
        assert_eq!(config.github.token_env, "ACME_TOKEN");
    }

    #[test]
    fn test_file_not_found() {
        let result = AuditConfig::load_from_file("/nonexistent/ipr-check.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_defaults() {
        let config: AuditConfig = toml::from_str("").unwrap();
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.github.org, "tc39");
        assert_eq!(config.github.token_env, "GH_TOKEN");
        assert_eq!(config.github.page_size, 100);
        assert_eq!(config.sheet.key_env, "GOOGLE_API_KEY");
        assert_eq!(config.sheet.range, "Sheet1!A2:A");
        assert_eq!(config.exceptions.len(), 5);
        assert!(config.exceptions.iter().any(|e| e == "sideshowbarker"));
    }

    #[test]
    fn test_resolve_env_vars() {
        std::env::set_var("TEST_IPR_TOKEN", "ghp_abc");
        std::env::set_var("TEST_IPR_KEY", "AIza123");

        let mut config = AuditConfig::default();
        config.github.token_env = "TEST_IPR_TOKEN".into();
        config.sheet.key_env = "TEST_IPR_KEY".into();
        config.resolve_env_vars().unwrap();

        assert_eq!(config.github.token.as_deref(), Some("ghp_abc"));
        assert_eq!(config.sheet.key.as_deref(), Some("AIza123"));

        std::env::remove_var("TEST_IPR_TOKEN");
        std::env::remove_var("TEST_IPR_KEY");
    }

    #[test]
    fn test_resolve_env_vars_missing_key() {
        std::env::set_var("TEST_IPR_TOKEN_ONLY", "ghp_abc");

        let mut config = AuditConfig::default();
        config.github.token_env = "TEST_IPR_TOKEN_ONLY".into();
        config.sheet.key_env = "TEST_IPR_KEY_UNSET".into();
        let result = config.resolve_env_vars();
        assert!(matches!(
            result,
            Err(ConfigError::EnvVarMissing { ref var, .. }) if var == "TEST_IPR_KEY_UNSET"
        ));

        std::env::remove_var("TEST_IPR_TOKEN_ONLY");
    }

    #[test]
    fn test_resolve_env_vars_empty_token() {
        std::env::set_var("TEST_IPR_EMPTY_TOKEN", "");

        let mut config = AuditConfig::default();
        config.github.token_env = "TEST_IPR_EMPTY_TOKEN".into();
        let result = config.resolve_env_vars();
        assert!(matches!(
            result,
            Err(ConfigError::EnvVarMissing { ref field, .. }) if field == "github.token_env"
        ));

        std::env::remove_var("TEST_IPR_EMPTY_TOKEN");
    }

    #[test]
    fn test_validate_accepts_resolved_defaults() {
        assert!(resolved().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_secret() {
        let mut config = resolved();
        config.sheet.key = None;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EnvVarMissing { ref field, .. }) if field == "sheet.key_env"
        ));
    }

    #[test]
    fn test_validate_rejects_bad_page_size() {
        let mut config = resolved();
        config.github.page_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "github.page_size"
        ));
        config.github.page_size = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_team() {
        let mut config = resolved();
        config.github.emeriti_team = "  ".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "github.emeriti_team"
        ));
    }
}
