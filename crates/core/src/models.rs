//! Shared data types for an audit run.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// The positional inputs of an audit: which repository, at which revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRequest {
    /// Repository in `owner/name` format.
    pub repo: String,
    /// Branch, tag, or hash to audit.
    pub revision: String,
}

impl AuditRequest {
    pub fn new(repo: impl Into<String>, revision: impl Into<String>) -> Result<Self, ConfigError> {
        let request = Self {
            repo: repo.into().trim().to_string(),
            revision: revision.into().trim().to_string(),
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repo.is_empty() {
            return Err(ConfigError::ArgumentMissing("slug".into()));
        }
        if self.revision.is_empty() {
            return Err(ConfigError::ArgumentMissing("revision".into()));
        }
        let mut parts = self.repo.split('/');
        let well_formed = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty()
        );
        if !well_formed {
            return Err(ConfigError::InvalidValue {
                field: "slug".into(),
                detail: format!("'{}' is not in 'owner/name' format", self.repo),
            });
        }
        Ok(())
    }
}

/// The pre-authorized identity sets, all lowercase.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationSets {
    /// Logins registered in the agreement sheet.
    pub signers: BTreeSet<String>,
    /// Members of the delegates team.
    pub delegates: BTreeSet<String>,
    /// Members of the emeriti team.
    pub emeriti: BTreeSet<String>,
    /// Static exceptions from the configuration.
    pub exceptions: HashSet<String>,
}

impl AuthorizationSets {
    /// Whether `login` is covered by any source. Case-insensitive.
    pub fn covers(&self, login: &str) -> bool {
        let login = login.to_lowercase();
        self.signers.contains(&login)
            || self.delegates.contains(&login)
            || self.emeriti.contains(&login)
            || self.exceptions.contains(&login)
    }
}

/// Everything gathered and computed by one audit run.
#[derive(Debug, Clone)]
pub struct AuditReport {
    /// The short hash (or verbatim reference) that was audited.
    pub revision: String,
    /// Distinct commit authors, in first-seen order.
    pub authors: Vec<String>,
    /// The sets the authors were checked against.
    pub sets: AuthorizationSets,
    /// Authors not covered by any set, in author order.
    pub uncovered: Vec<String>,
}

impl AuditReport {
    pub fn outcome(&self) -> AuditOutcome {
        if self.uncovered.is_empty() {
            AuditOutcome::AllCovered
        } else {
            AuditOutcome::Uncovered(self.uncovered.clone())
        }
    }
}

/// Verdict of an audit that completed without infrastructure failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditOutcome {
    AllCovered,
    Uncovered(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accepts_slug_and_revision() {
        let req = AuditRequest::new("tc39/ecma402", " main ").unwrap();
        assert_eq!(req.repo, "tc39/ecma402");
        assert_eq!(req.revision, "main");
    }

    #[test]
    fn test_request_missing_arguments() {
        assert!(matches!(
            AuditRequest::new("", "main"),
            Err(ConfigError::ArgumentMissing(ref a)) if a == "slug"
        ));
        assert!(matches!(
            AuditRequest::new("tc39/ecma402", ""),
            Err(ConfigError::ArgumentMissing(ref a)) if a == "revision"
        ));
    }

    #[test]
    fn test_request_rejects_malformed_slug() {
        for slug in ["noslash", "/name", "owner/", "a/b/c"] {
            assert!(
                matches!(
                    AuditRequest::new(slug, "main"),
                    Err(ConfigError::InvalidValue { .. })
                ),
                "{slug} should be rejected"
            );
        }
    }

    #[test]
    fn test_covers_is_case_insensitive() {
        let mut sets = AuthorizationSets::default();
        sets.delegates.insert("octocat".into());
        assert!(sets.covers("OctoCat"));
        assert!(!sets.covers("hubot"));
    }

    #[test]
    fn test_outcome() {
        let mut report = AuditReport {
            revision: "abc1234".into(),
            authors: vec!["a".into()],
            sets: AuthorizationSets::default(),
            uncovered: vec![],
        };
        assert_eq!(report.outcome(), AuditOutcome::AllCovered);
        report.uncovered = vec!["a".into()];
        assert_eq!(report.outcome(), AuditOutcome::Uncovered(vec!["a".into()]));
    }
}
