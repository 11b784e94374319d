//! Local git checkout as a source-control collaborator

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use git2::{Commit, DiffOptions, Patch, Repository, Sort};
use tracing::debug;

use crate::review::FileDiff;
use crate::services::{CommitSummary, SourceControl};
use crate::{Error, Result};

/// Default number of commits returned by [`LocalRepo::list_commits`]
pub const DEFAULT_COMMIT_LIMIT: usize = 30;

/// Reads commits and diffs from a repository on disk
///
/// The `owner`/`repo` arguments of [`SourceControl`] are ignored; the
/// checkout itself identifies the repository.
#[derive(Debug, Clone)]
pub struct LocalRepo {
    root: PathBuf,
    limit: usize,
}

fn git_error(e: git2::Error) -> Error {
    Error::SourceControl(format!("git: {}", e.message()))
}

impl LocalRepo {
    /// Open the repository containing `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let repo = Repository::discover(path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                Error::Config(format!("Not a git repository: {}", path.display()))
            } else {
                git_error(e)
            }
        })?;

        let root = repo
            .workdir()
            .unwrap_or_else(|| repo.path())
            .to_path_buf();

        Ok(Self {
            root,
            limit: DEFAULT_COMMIT_LIMIT,
        })
    }

    /// Cap the number of commits listed
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn repository(&self) -> Result<Repository> {
        Repository::open(&self.root).map_err(git_error)
    }

    /// Newest-first commits reachable from HEAD
    pub fn recent_commits(&self) -> Result<Vec<CommitSummary>> {
        let repo = self.repository()?;
        let mut walk = repo.revwalk().map_err(git_error)?;
        walk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)
            .map_err(git_error)?;
        walk.push_head().map_err(git_error)?;

        walk.take(self.limit)
            .map(|oid| -> Result<CommitSummary> {
                let commit = repo.find_commit(oid.map_err(git_error)?).map_err(git_error)?;
                Ok(summarize(&commit))
            })
            .collect()
    }

    /// Per-file patches of `rev` against its first parent
    ///
    /// A root commit is diffed against the empty tree.
    pub fn diff_files(&self, rev: &str) -> Result<Vec<FileDiff>> {
        let repo = self.repository()?;
        let commit = repo
            .revparse_single(rev)
            .and_then(|obj| obj.peel_to_commit())
            .map_err(git_error)?;

        let tree = commit.tree().map_err(git_error)?;
        let parent_tree = match commit.parent(0) {
            Ok(parent) => Some(parent.tree().map_err(git_error)?),
            Err(_) => None,
        };

        let mut opts = DiffOptions::new();
        let diff = repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))
            .map_err(git_error)?;

        let mut files = Vec::new();
        for idx in 0..diff.deltas().len() {
            let Some(mut patch) = Patch::from_diff(&diff, idx).map_err(git_error)? else {
                continue;
            };
            let delta = patch.delta();
            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default();
            let buf = patch.to_buf().map_err(git_error)?;
            files.push(FileDiff::new(path, String::from_utf8_lossy(&buf).into_owned()));
        }

        debug!(rev, files = files.len(), "Computed local diff");
        Ok(files)
    }
}

fn summarize(commit: &Commit<'_>) -> CommitSummary {
    let author = commit.author();
    CommitSummary {
        sha: commit.id().to_string(),
        author: author.name().unwrap_or_default().to_string(),
        message: commit.message().unwrap_or_default().trim().to_string(),
        date: DateTime::<Utc>::from_timestamp(commit.time().seconds(), 0).unwrap_or_default(),
        url: String::new(),
    }
}

#[async_trait]
impl SourceControl for LocalRepo {
    async fn list_commits(&self, _owner: &str, _repo: &str) -> Result<Vec<CommitSummary>> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.recent_commits())
            .await
            .map_err(|e| Error::Other(format!("git task failed: {}", e)))?
    }

    async fn commit_diff(&self, owner: &str, repo: &str, sha: &str) -> Result<String> {
        let files = self.commit_files(owner, repo, sha).await?;
        Ok(files.into_iter().map(|f| f.diff).collect::<Vec<_>>().join(""))
    }

    async fn commit_files(&self, _owner: &str, _repo: &str, sha: &str) -> Result<Vec<FileDiff>> {
        let this = self.clone();
        let sha = sha.to_string();
        tokio::task::spawn_blocking(move || this.diff_files(&sha))
            .await
            .map_err(|e| Error::Other(format!("git task failed: {}", e)))?
    }
}
