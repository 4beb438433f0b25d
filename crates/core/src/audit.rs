//! The authorization audit.
//!
//! [`Auditor`] resolves the revision, then runs four independent acquisition
//! chains concurrently on the current task: commit authors, delegates,
//! emeriti, and sheet signers. It waits for all of them and fails on the
//! first error. Within a chain, pages are fetched one after another.

use std::collections::{BTreeSet, HashSet};

use tracing::{info, instrument};

use crate::config::AuditConfig;
use crate::errors::{AuditError, ConfigError, IntegrityError};
use crate::git::client::resolve_revision;
use crate::git::github::{CommitRecord, HostingService};
use crate::identity::collect_logins;
use crate::models::{AuditReport, AuditRequest, AuthorizationSets};
use crate::paginate::fetch_all_pages;
use crate::sheets::{sheet_cells, SignerSheet};

/// Login of a commit's author.
///
/// An absent record has no author (`Ok(None)`). A record without an author
/// account, or whose account has no login, is an error naming the commit.
pub fn commit_author(record: Option<&CommitRecord>) -> Result<Option<String>, IntegrityError> {
    let Some(record) = record else {
        return Ok(None);
    };
    match record.author.as_ref().and_then(|a| a.login.as_deref()) {
        Some(login) if !login.is_empty() => Ok(Some(login.to_string())),
        _ => Err(IntegrityError::MissingAuthor {
            sha: record.sha.clone(),
        }),
    }
}

/// Distinct authors of `records` in first-seen order, compared
/// case-insensitively.
pub fn distinct_authors(records: &[Option<CommitRecord>]) -> Result<Vec<String>, IntegrityError> {
    let mut seen = HashSet::new();
    let mut authors = Vec::new();
    for record in records {
        if let Some(login) = commit_author(record.as_ref())? {
            if seen.insert(login.to_lowercase()) {
                authors.push(login);
            }
        }
    }
    Ok(authors)
}

/// Authors not covered by any of `sets`, in the order given.
pub fn evaluate(authors: &[String], sets: &AuthorizationSets) -> Vec<String> {
    authors
        .iter()
        .filter(|author| !sets.covers(author))
        .cloned()
        .collect()
}

/// One configured audit of one repository revision.
pub struct Auditor<H, S> {
    config: AuditConfig,
    request: AuditRequest,
    revision: String,
    hosting: H,
    sheet: S,
}

impl<H: HostingService, S: SignerSheet> Auditor<H, S> {
    /// Validate the inputs and pin the revision.
    ///
    /// Fails before any remote call if a secret or argument is missing.
    pub fn new(
        config: AuditConfig,
        request: AuditRequest,
        hosting: H,
        sheet: S,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        request.validate()?;
        let revision = resolve_revision(&config.git.workdir, &request.revision);
        Ok(Self {
            config,
            request,
            revision,
            hosting,
            sheet,
        })
    }

    /// The short hash (or verbatim reference) being audited.
    pub fn revision(&self) -> &str {
        &self.revision
    }

    /// Fetch everything and evaluate coverage.
    #[instrument(skip(self), fields(repo = %self.request.repo, revision = %self.revision))]
    pub async fn run(&self) -> Result<AuditReport, AuditError> {
        let (authors, delegates, emeriti, signers) = tokio::try_join!(
            self.commit_authors(),
            self.team_logins(&self.config.github.delegates_team),
            self.team_logins(&self.config.github.emeriti_team),
            self.signer_logins(),
        )?;

        let sets = AuthorizationSets {
            signers,
            delegates,
            emeriti,
            exceptions: self
                .config
                .exceptions
                .iter()
                .map(|e| e.to_lowercase())
                .collect(),
        };
        let uncovered = evaluate(&authors, &sets);
        info!(
            authors = authors.len(),
            uncovered = uncovered.len(),
            "audit evaluated"
        );

        Ok(AuditReport {
            revision: self.revision.clone(),
            authors,
            sets,
            uncovered,
        })
    }

    async fn commit_authors(&self) -> Result<Vec<String>, AuditError> {
        let per_page = self.config.github.page_size;
        let repo = self.request.repo.as_str();
        let revision = self.revision.as_str();
        let hosting = &self.hosting;
        let records = fetch_all_pages(per_page, move |page| {
            hosting.list_commits(repo, revision, page, per_page)
        })
        .await?;
        let authors = distinct_authors(&records)?;
        info!(commits = records.len(), authors = authors.len(), "collected commit authors");
        Ok(authors)
    }

    async fn team_logins(&self, team_slug: &str) -> Result<BTreeSet<String>, AuditError> {
        let team = self
            .hosting
            .get_team(&self.config.github.org, team_slug)
            .await?;
        let team_id = team.id.ok_or_else(|| IntegrityError::MissingTeamId {
            slug: team_slug.to_string(),
        })?;

        let per_page = self.config.github.page_size;
        let hosting = &self.hosting;
        let members = fetch_all_pages(per_page, move |page| {
            hosting.list_team_members(team_id, page, per_page)
        })
        .await?;
        let logins: BTreeSet<String> = members
            .into_iter()
            .map(|m| m.login.to_lowercase())
            .collect();
        info!(team = team_slug, members = logins.len(), "collected team members");
        Ok(logins)
    }

    async fn signer_logins(&self) -> Result<BTreeSet<String>, AuditError> {
        let payload = self
            .sheet
            .fetch_values(&self.config.sheet.spreadsheet_id, &self.config.sheet.range)
            .await?;
        let cells = sheet_cells(&payload)?;
        let logins = collect_logins(&cells);
        info!(cells = cells.len(), signers = logins.len(), "collected sheet signers");
        Ok(logins)
    }
}
