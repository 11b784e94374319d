//! Source-control collaborator

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::review::FileDiff;
use crate::Result;

/// A commit as listed by a source-control provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub sha: String,
    pub author: String,
    pub message: String,
    pub date: DateTime<Utc>,
    /// Web URL, empty when the provider has none
    #[serde(default)]
    pub url: String,
}

impl CommitSummary {
    /// First seven characters of the SHA
    pub fn short_sha(&self) -> &str {
        short_sha(&self.sha)
    }
}

/// First seven characters of a commit id (or the whole id if shorter)
pub fn short_sha(sha: &str) -> &str {
    match sha.char_indices().nth(7) {
        Some((idx, _)) => &sha[..idx],
        None => sha,
    }
}

/// Read access to commits and their diffs
///
/// Rate-limit and not-found failures are reported as ordinary errors.
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// List recent commits of `owner/repo`
    async fn list_commits(&self, owner: &str, repo: &str) -> Result<Vec<CommitSummary>>;

    /// Full unified diff of a commit
    async fn commit_diff(&self, owner: &str, repo: &str, sha: &str) -> Result<String>;

    /// Per-file diffs of a commit
    ///
    /// Defaults to the whole diff as a single `commit.diff` entry.
    async fn commit_files(&self, owner: &str, repo: &str, sha: &str) -> Result<Vec<FileDiff>> {
        let diff = self.commit_diff(owner, repo, sha).await?;
        Ok(vec![FileDiff::new("commit.diff", diff)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    struct DiffOnly;

    #[async_trait]
    impl SourceControl for DiffOnly {
        async fn list_commits(&self, _owner: &str, _repo: &str) -> Result<Vec<CommitSummary>> {
            Err(Error::SourceControl("not supported".to_string()))
        }

        async fn commit_diff(&self, _owner: &str, _repo: &str, sha: &str) -> Result<String> {
            Ok(format!("diff for {}", sha))
        }
    }

    #[tokio::test]
    async fn test_default_commit_files_wraps_diff() {
        let files = DiffOnly.commit_files("o", "r", "abc").await.unwrap();
        assert_eq!(files, vec![FileDiff::new("commit.diff", "diff for abc")]);
    }

    #[test]
    fn test_short_sha() {
        assert_eq!(short_sha("0123456789abcdef"), "0123456");
        assert_eq!(short_sha("abc"), "abc");
        assert_eq!(short_sha("0123456"), "0123456");
    }
}
