//! Review commands

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use guardian_core::git::LocalRepo;
use guardian_core::review::FileDiff;
use guardian_core::services::SourceControl;
use guardian_core::ReviewRequest;
use guardian_github::parse_github_url;

use super::{print_json, Context};

/// Review a code snippet or a set of files
#[derive(Args, Debug)]
pub struct ReviewArgs {
    /// Inline code to review
    #[arg(short, long)]
    pub snippet: Option<String>,

    /// Files whose contents are reviewed (takes precedence over --snippet)
    #[arg(short, long = "file")]
    pub files: Vec<PathBuf>,

    /// Repository label for the prompt and notification
    #[arg(long, default_value = "")]
    pub repo: String,

    /// Commit label for the prompt and notification
    #[arg(long, default_value = "")]
    pub commit: String,

    /// Send a notification when the review completes
    #[arg(long)]
    pub notify: bool,
}

impl ReviewArgs {
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let mut files = Vec::with_capacity(self.files.len());
        for path in &self.files {
            let contents = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            files.push(FileDiff::new(path.display().to_string(), contents));
        }

        let request = ReviewRequest {
            repo: self.repo.clone(),
            commit_id: self.commit.clone(),
            code_snippet: self.snippet.clone(),
            files,
        };

        let pipeline = ctx.pipeline()?;
        let notify = self.notify || ctx.config.review.notify;
        let outcome = if notify {
            pipeline.run_and_notify(&request).await?
        } else {
            pipeline.run(&request).await?
        };

        print_json(&outcome)
    }
}

/// Fetch a commit's diff and review it
#[derive(Args, Debug)]
pub struct ReviewCommitArgs {
    /// Repository as owner/repo or a GitHub URL
    pub repo: String,

    /// Commit SHA (or any revision when --local is used)
    pub sha: String,

    /// Read the commit from a local checkout instead of GitHub
    #[arg(long)]
    pub local: Option<PathBuf>,
}

impl ReviewCommitArgs {
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let (owner, repo) = parse_github_url(&self.repo)?;
        let source: Box<dyn SourceControl> = match &self.local {
            Some(path) => Box::new(LocalRepo::open(path)?),
            None => Box::new(ctx.github()?),
        };

        let outcome = ctx
            .pipeline()?
            .review_commit(source.as_ref(), &owner, &repo, &self.sha)
            .await?;

        print_json(&outcome)
    }
}
