//! Local Git repository operations via `git2`.

use std::path::{Path, PathBuf};

use git2::Repository;
use tracing::{debug, info, warn};

use crate::errors::GitError;

/// Read-only view of the local checkout, used to pin the audited revision.
pub struct GitClient {
    repo: Repository,
    repo_path: PathBuf,
}

impl GitClient {
    /// Open the repository containing `repo_path` (searching upwards).
    pub fn new<P: AsRef<Path>>(repo_path: P) -> Result<Self, GitError> {
        let path = repo_path.as_ref();
        debug!(path = %path.display(), "opening git repository");
        let repo = Repository::discover(path)
            .map_err(|_| GitError::RepositoryNotFound(path.display().to_string()))?;
        Ok(Self {
            repo,
            repo_path: path.to_path_buf(),
        })
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// Resolve a branch, tag, or hash to the abbreviated hash of its commit.
    pub fn short_hash(&self, reference: &str) -> Result<String, GitError> {
        let object = self
            .repo
            .revparse_single(reference)
            .map_err(|_| GitError::RefNotFound(reference.to_string()))?;
        let commit = object.peel_to_commit()?;
        let short = commit.as_object().short_id()?;
        short
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| GitError::RefNotFound(reference.to_string()))
    }
}

/// Resolve `reference` to a short hash using the checkout at `workdir`.
///
/// Falls back to `reference` verbatim when there is no checkout or it does
/// not know the ref, so a SHA that only exists on the remote still works.
pub fn resolve_revision(workdir: &Path, reference: &str) -> String {
    match GitClient::new(workdir).and_then(|client| client.short_hash(reference)) {
        Ok(short) => {
            info!(reference, short = %short, "resolved revision");
            short
        }
        Err(e) => {
            warn!(reference, error = %e, "could not resolve revision locally, using it verbatim");
            reference.to_string()
        }
    }
}
