//! Commit listing and diffs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use guardian_core::review::FileDiff;
use guardian_core::services::{CommitSummary, SourceControl};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Error, GitHubClient, Result};

/// Commits returned per listing
pub const COMMITS_PER_PAGE: u8 = 30;

#[derive(Debug, Serialize)]
struct PageParams {
    per_page: u8,
}

#[derive(Debug, Deserialize)]
struct CommitItem {
    sha: String,
    #[serde(default)]
    html_url: String,
    commit: CommitDetail,
    #[serde(default)]
    author: Option<Account>,
    #[serde(default)]
    files: Vec<FileItem>,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    message: String,
    author: Option<Signature>,
}

#[derive(Debug, Deserialize)]
struct Signature {
    name: String,
    date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct Account {
    login: String,
}

#[derive(Debug, Deserialize)]
struct FileItem {
    filename: String,
    /// Absent for binary files and very large diffs
    patch: Option<String>,
}

impl From<CommitItem> for CommitSummary {
    fn from(item: CommitItem) -> Self {
        let (name, date) = item
            .commit
            .author
            .map(|a| (a.name, a.date))
            .unwrap_or_default();

        CommitSummary {
            sha: item.sha,
            // Prefer the git author name, fall back to the account login
            author: if name.is_empty() {
                item.author.map(|a| a.login).unwrap_or_default()
            } else {
                name
            },
            message: item.commit.message,
            date: date.unwrap_or_default(),
            url: item.html_url,
        }
    }
}

impl GitHubClient {
    async fn fetch_commit(&self, owner: &str, repo: &str, sha: &str) -> Result<CommitItem> {
        debug!(owner, repo, sha, "Fetching commit");

        self.client()
            .get(format!("/repos/{}/{}/commits/{}", owner, repo, sha), None::<&()>)
            .await
            .map_err(|e| Error::from_api(e, || format!("commit {} in {}/{}", sha, owner, repo)))
    }

    /// Recent commits on the default branch
    pub async fn recent_commits(&self, owner: &str, repo: &str) -> Result<Vec<CommitSummary>> {
        debug!(owner, repo, "Listing commits");

        let items: Vec<CommitItem> = self
            .client()
            .get(
                format!("/repos/{}/{}/commits", owner, repo),
                Some(&PageParams {
                    per_page: COMMITS_PER_PAGE,
                }),
            )
            .await
            .map_err(|e| Error::from_api(e, || format!("repository {}/{}", owner, repo)))?;

        info!(owner, repo, count = items.len(), "Fetched commits");
        Ok(items.into_iter().map(CommitSummary::from).collect())
    }

    /// Per-file patches of a commit
    pub async fn commit_patches(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> Result<Vec<FileDiff>> {
        let commit = self.fetch_commit(owner, repo, sha).await?;
        Ok(commit
            .files
            .into_iter()
            .map(|f| FileDiff::new(f.filename, f.patch.unwrap_or_default()))
            .collect())
    }
}

#[async_trait]
impl SourceControl for GitHubClient {
    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
    ) -> guardian_core::Result<Vec<CommitSummary>> {
        Ok(self.recent_commits(owner, repo).await?)
    }

    async fn commit_diff(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> guardian_core::Result<String> {
        let files = self.commit_patches(owner, repo, sha).await?;
        Ok(files
            .iter()
            .map(|f| format!("diff --git a/{0} b/{0}\n{1}", f.path, f.diff))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    async fn commit_files(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> guardian_core::Result<Vec<FileDiff>> {
        Ok(self.commit_patches(owner, repo, sha).await?)
    }
}
