//! Source-control listing commands

use std::path::PathBuf;

use clap::Args;
use guardian_core::git::LocalRepo;
use guardian_core::services::SourceControl;
use guardian_github::parse_github_url;

use super::{print_json, Context};

/// List recent commits
#[derive(Args, Debug)]
pub struct CommitsArgs {
    /// Repository as owner/repo or a GitHub URL
    pub repo: String,

    /// Read commits from a local checkout instead of GitHub
    #[arg(long)]
    pub local: Option<PathBuf>,
}

impl CommitsArgs {
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let (owner, repo) = parse_github_url(&self.repo)?;
        let commits = match &self.local {
            Some(path) => LocalRepo::open(path)?.list_commits(&owner, &repo).await?,
            None => ctx.github()?.list_commits(&owner, &repo).await?,
        };
        print_json(&commits)
    }
}

/// List a user's repositories
#[derive(Args, Debug)]
pub struct ReposArgs {
    /// GitHub user name
    pub user: String,
}

impl ReposArgs {
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let repos = ctx.github()?.list_user_repos(&self.user).await?;
        print_json(&repos)
    }
}

/// List open pull requests
#[derive(Args, Debug)]
pub struct PullsArgs {
    /// Repository as owner/repo or a GitHub URL
    pub repo: String,
}

impl PullsArgs {
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let (owner, repo) = parse_github_url(&self.repo)?;
        let pulls = ctx.github()?.list_pulls(&owner, &repo).await?;
        print_json(&pulls)
    }
}
