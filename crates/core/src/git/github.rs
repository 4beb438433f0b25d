//! GitHub REST API client.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::errors::GitHubError;

/// One entry of `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRecord {
    pub sha: String,
    /// The linked GitHub account. `null` when GitHub cannot attribute the
    /// commit to an account.
    #[serde(default)]
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitAuthor {
    #[serde(default)]
    pub login: Option<String>,
}

/// Response of `GET /orgs/{org}/teams/{team_slug}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub slug: Option<String>,
}

/// One entry of `GET /teams/{team_id}/members`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub login: String,
}

/// The hosting-service calls an audit depends on.
///
/// Listing methods fetch a single page; pagination is driven by
/// [`crate::paginate::fetch_all_pages`].
#[allow(async_fn_in_trait)]
pub trait HostingService {
    /// One page of the history reachable from `sha`. Entries may be `null`.
    async fn list_commits(
        &self,
        repo: &str,
        sha: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Option<CommitRecord>>, GitHubError>;

    /// Look up a team by slug.
    async fn get_team(&self, org: &str, team_slug: &str) -> Result<Team, GitHubError>;

    /// One page of a team's members.
    async fn list_team_members(
        &self,
        team_id: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<TeamMember>, GitHubError>;
}

impl<T: HostingService + ?Sized> HostingService for &T {
    async fn list_commits(
        &self,
        repo: &str,
        sha: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Option<CommitRecord>>, GitHubError> {
        (**self).list_commits(repo, sha, page, per_page).await
    }

    async fn get_team(&self, org: &str, team_slug: &str) -> Result<Team, GitHubError> {
        (**self).get_team(org, team_slug).await
    }

    async fn list_team_members(
        &self,
        team_id: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<TeamMember>, GitHubError> {
        (**self).list_team_members(team_id, page, per_page).await
    }
}

/// Asynchronous GitHub REST API client.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl GitHubClient {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        let token = token.into();
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("ipr-check/0.1"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("failed to build reqwest client");
        info!(api_url = %api_url, "created GitHubClient");
        Self {
            http,
            api_url,
            token,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, GitHubError> {
        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;
        check_response(&resp, url)?;
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| GitHubError::ParseError(format!("{}: {}", url, e)))
    }
}

impl HostingService for GitHubClient {
    #[instrument(skip(self))]
    async fn list_commits(
        &self,
        repo: &str,
        sha: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Option<CommitRecord>>, GitHubError> {
        let url = format!("{}/repos/{}/commits", self.api_url, repo);
        let commits: Vec<Option<CommitRecord>> = self
            .get_json(
                &url,
                &[
                    ("anon", "1".to_string()),
                    ("per_page", per_page.to_string()),
                    ("page", page.to_string()),
                    ("sha", sha.to_string()),
                ],
            )
            .await?;
        debug!(count = commits.len(), "fetched commits");
        Ok(commits)
    }

    #[instrument(skip(self))]
    async fn get_team(&self, org: &str, team_slug: &str) -> Result<Team, GitHubError> {
        let url = format!("{}/orgs/{}/teams/{}", self.api_url, org, team_slug);
        let team: Team = self.get_json(&url, &[]).await?;
        debug!(id = ?team.id, "fetched team");
        Ok(team)
    }

    #[instrument(skip(self))]
    async fn list_team_members(
        &self,
        team_id: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<TeamMember>, GitHubError> {
        let url = format!("{}/teams/{}/members", self.api_url, team_id);
        let members: Vec<TeamMember> = self
            .get_json(
                &url,
                &[
                    ("per_page", per_page.to_string()),
                    ("page", page.to_string()),
                ],
            )
            .await?;
        debug!(count = members.len(), "fetched team members");
        Ok(members)
    }
}

fn check_response(resp: &reqwest::Response, url: &str) -> Result<(), GitHubError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    if status.as_u16() == 429
        || (status.as_u16() == 403
            && resp
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
                == Some("0"))
    {
        let reset = resp
            .headers()
            .get("x-ratelimit-reset")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();
        return Err(GitHubError::RateLimited { reset_at: reset });
    }
    if status.as_u16() == 401 || status.as_u16() == 403 {
        return Err(GitHubError::AuthenticationFailed(format!(
            "HTTP {}; {}",
            status, url
        )));
    }
    Err(GitHubError::ApiError {
        status: status.as_u16(),
        url: url.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_page_with_null_entries() {
        let json = r#"[
            {"sha": "aaa", "author": {"login": "Octocat", "id": 1}},
            null,
            {"sha": "bbb", "author": null},
            {"sha": "ccc"},
            {"sha": "ddd", "author": {"id": 7}}
        ]"#;
        let page: Vec<Option<CommitRecord>> = serde_json::from_str(json).unwrap();
        assert_eq!(page.len(), 5);
        let first = page[0].as_ref().unwrap();
        assert_eq!(first.author.as_ref().unwrap().login.as_deref(), Some("Octocat"));
        assert!(page[1].is_none());
        assert!(page[2].as_ref().unwrap().author.is_none());
        assert!(page[3].as_ref().unwrap().author.is_none());
        assert!(page[4].as_ref().unwrap().author.as_ref().unwrap().login.is_none());
    }

    #[test]
    fn test_team_without_id() {
        let team: Team = serde_json::from_str(r#"{"slug": "delegates"}"#).unwrap();
        assert!(team.id.is_none());
        let team: Team = serde_json::from_str(r#"{"id": 42, "slug": "emeriti"}"#).unwrap();
        assert_eq!(team.id, Some(42));
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = GitHubClient::new("https://api.github.com/", "token");
        assert_eq!(client.api_url(), "https://api.github.com");
    }
}
