//! Guardian GitHub - GitHub source-control collaborator for CodeGuardian
//!
//! Implements [`guardian_core::services::SourceControl`] over the GitHub
//! REST API, plus the repository and pull request listings used by the CLI.

mod client;
mod commits;
mod error;
mod repos;

pub use client::{parse_github_url, GitHubClient};
pub use commits::COMMITS_PER_PAGE;
pub use error::{Error, Result};
pub use repos::{PrState, PullSummary, RepoSummary};
