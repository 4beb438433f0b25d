//! Contributor agreement audit.
//!
//! Checks that every author reachable from a revision of a GitHub
//! repository has signed the agreement sheet, or belongs to the delegates or
//! emeriti team, or is listed as an exception. Exits non-zero when any
//! author is uncovered or when the audit cannot complete.
//!
//! Secrets come from the environment: `GH_TOKEN` and `GOOGLE_API_KEY` by
//! default, renamable in the optional config file.

mod report;
mod style;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ipr_audit_core::{
    AuditConfig, AuditOutcome, AuditRequest, Auditor, GitHubClient, SheetsClient,
};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// Check that every commit author has signed the contributor agreement.
#[derive(Parser, Debug)]
#[command(name = "ipr-check", version, about)]
struct Cli {
    /// Repository to audit, in `owner/name` format.
    slug: String,

    /// Branch, tag, or commit hash to audit.
    revision: String,

    /// Path to an optional TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Local checkout used to resolve the revision to a short hash.
    #[arg(long)]
    workdir: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(AuditOutcome::AllCovered) => ExitCode::SUCCESS,
        Ok(AuditOutcome::Uncovered(_)) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}", style::error(&format!("Error: {:#}", e)));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<AuditOutcome> {
    let request = AuditRequest::new(cli.slug, cli.revision).context("invalid arguments")?;

    let mut config = AuditConfig::load_and_resolve(cli.config.as_deref())
        .context("failed to load configuration")?;
    if let Some(workdir) = cli.workdir {
        config.git.workdir = workdir;
    }
    debug!(
        github_api = %config.github.api_url,
        sheets_api = %config.sheet.api_url,
        "configuration ready"
    );

    let hosting = GitHubClient::new(
        &config.github.api_url,
        config.github.token.clone().unwrap_or_default(),
    );
    let sheet = SheetsClient::new(
        &config.sheet.api_url,
        config.sheet.key.clone().unwrap_or_default(),
    );
    let auditor =
        Auditor::new(config, request, hosting, sheet).context("invalid audit configuration")?;

    println!("{}", style::header(&format!("Getting data for {}", auditor.revision())));
    let report = auditor.run().await.context("audit failed")?;
    report::print_report(&report);
    Ok(report.outcome())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_positional_arguments_required() {
        assert!(Cli::try_parse_from(["ipr-check"]).is_err());
        assert!(Cli::try_parse_from(["ipr-check", "tc39/ecma402"]).is_err());
        let cli = Cli::try_parse_from(["ipr-check", "tc39/ecma402", "main"]).unwrap();
        assert_eq!(cli.slug, "tc39/ecma402");
        assert_eq!(cli.revision, "main");
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn test_optional_flags() {
        let cli = Cli::try_parse_from([
            "ipr-check",
            "--config",
            "/etc/ipr-check.toml",
            "--workdir",
            "/srv/ecma402",
            "tc39/ecma402",
            "es2024",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/ipr-check.toml")));
        assert_eq!(cli.workdir, Some(PathBuf::from("/srv/ecma402")));
    }
}
