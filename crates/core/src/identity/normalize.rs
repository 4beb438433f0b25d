use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex_lite::Regex;
use tracing::debug;

fn profile_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(https?://)?github\.com/").expect("valid regex"))
}

fn login_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9_-]{1,39}$").expect("valid regex"))
}

/// Whether `login` is already a normalized GitHub login.
pub fn is_valid_login(login: &str) -> bool {
    login_pattern().is_match(login)
}

/// Reduce a sheet cell to a lowercase GitHub login.
///
/// Accepts `login`, `@login`, `github.com/login` and
/// `http(s)://github.com/login`. Returns `None` when what remains is not a
/// valid login. Applying it to its own output returns the same login.
pub fn normalize_login(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    let without_host = profile_prefix().replace(trimmed, "");
    let without_at = without_host.strip_prefix('@').unwrap_or(&*without_host);
    let login = without_at.to_lowercase();
    if is_valid_login(&login) {
        Some(login)
    } else {
        None
    }
}

/// Normalize every cell, keeping the valid logins as a sorted set.
pub fn collect_logins<I, S>(cells: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut logins = BTreeSet::new();
    let mut discarded = 0usize;
    for cell in cells {
        match normalize_login(cell.as_ref()) {
            Some(login) => {
                logins.insert(login);
            }
            None => discarded += 1,
        }
    }
    debug!(kept = logins.len(), discarded, "normalized sheet cells");
    logins
}
