//! Repository discovery and pull request listing

use chrono::{DateTime, Utc};
use octocrab::models::pulls::PullRequest as OctocrabPR;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Error, GitHubClient, Result};

/// A repository owned by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSummary {
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// PR state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrState {
    Open,
    Closed,
}

impl From<octocrab::models::IssueState> for PrState {
    fn from(state: octocrab::models::IssueState) -> Self {
        match state {
            octocrab::models::IssueState::Closed => PrState::Closed,
            _ => PrState::Open,
        }
    }
}

/// Pull request representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullSummary {
    pub number: u64,
    pub title: String,
    pub state: PrState,
    /// Login of the PR author
    pub author: String,
    pub merged: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub head_branch: String,
    pub base_branch: String,
    pub url: String,
}

impl From<OctocrabPR> for PullSummary {
    fn from(pr: OctocrabPR) -> Self {
        PullSummary {
            number: pr.number,
            title: pr.title.unwrap_or_default(),
            state: pr.state.map(PrState::from).unwrap_or(PrState::Open),
            author: pr.user.map(|u| u.login).unwrap_or_default(),
            merged: pr.merged_at.is_some(),
            created_at: pr.created_at,
            head_branch: pr.head.ref_field,
            base_branch: pr.base.ref_field,
            url: pr.html_url.map(|u| u.to_string()).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RepoParams<'a> {
    sort: &'a str,
    per_page: u8,
}

impl GitHubClient {
    /// Public repositories of `user`, most recently updated first
    pub async fn list_user_repos(&self, user: &str) -> Result<Vec<RepoSummary>> {
        debug!(user, "Listing repositories");

        let repos: Vec<RepoSummary> = self
            .client()
            .get(
                format!("/users/{}/repos", user),
                Some(&RepoParams {
                    sort: "updated",
                    per_page: 100,
                }),
            )
            .await
            .map_err(|e| Error::from_api(e, || format!("user {}", user)))?;

        info!(user, count = repos.len(), "Fetched repositories");
        Ok(repos)
    }

    /// Open pull requests of `owner/repo`
    pub async fn list_pulls(&self, owner: &str, repo: &str) -> Result<Vec<PullSummary>> {
        debug!(owner, repo, "Listing pull requests");

        let page = self
            .client()
            .pulls(owner, repo)
            .list()
            .state(octocrab::params::State::Open)
            .send()
            .await
            .map_err(|e| Error::from_api(e, || format!("repository {}/{}", owner, repo)))?;

        let pulls: Vec<PullSummary> = page.items.into_iter().map(PullSummary::from).collect();
        info!(owner, repo, count = pulls.len(), "Fetched pull requests");
        Ok(pulls)
    }
}
