//! GitHub API client using octocrab

use crate::{Error, Result};
use guardian_core::Secrets;
use octocrab::Octocrab;
use tracing::info;

/// GitHub REST client, not bound to a single repository
#[derive(Clone)]
pub struct GitHubClient {
    client: Octocrab,
    authenticated: bool,
}

impl GitHubClient {
    /// Create a client, authenticated when a token is given
    ///
    /// Public repositories can be read anonymously at a lower rate limit.
    pub fn new(token: Option<String>) -> Result<Self> {
        let builder = Octocrab::builder();
        let authenticated = token.is_some();
        let client = match token {
            Some(token) => builder.personal_token(token).build(),
            None => builder.build(),
        };
        Self::finish(client, authenticated)
    }

    /// Create a client with the token from [`Secrets`]
    ///
    /// Token is loaded from (in priority order):
    /// 1. GITHUB_TOKEN environment variable
    /// 2. ~/.config/codeguardian/secrets.toml
    pub fn from_secrets(secrets: &Secrets) -> Result<Self> {
        Self::new(secrets.github_token())
    }

    /// Create a client against a different API root (GitHub Enterprise, tests)
    pub fn with_base_uri(base_uri: &str, token: Option<String>) -> Result<Self> {
        let builder = Octocrab::builder()
            .base_uri(base_uri)
            .map_err(|e| Error::Parse(format!("Invalid base URI {}: {}", base_uri, e)))?;
        let authenticated = token.is_some();
        let client = match token {
            Some(token) => builder.personal_token(token).build(),
            None => builder.build(),
        };
        Self::finish(client, authenticated)
    }

    fn finish(client: octocrab::Result<Octocrab>, authenticated: bool) -> Result<Self> {
        let client =
            client.map_err(|e| Error::Auth(format!("Failed to create GitHub client: {}", e)))?;

        info!(authenticated, "Created GitHub client");
        Ok(Self {
            client,
            authenticated,
        })
    }

    /// Whether requests carry a token
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Get the underlying octocrab client
    pub fn client(&self) -> &Octocrab {
        &self.client
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("authenticated", &self.authenticated)
            .finish_non_exhaustive()
    }
}

/// Parse a repository reference into owner and repo
///
/// Supports formats:
/// - owner/repo
/// - https://github.com/owner/repo
/// - git@github.com:owner/repo.git
pub fn parse_github_url(url: &str) -> Result<(String, String)> {
    let invalid = || {
        Error::Parse(format!(
            "Invalid repository format: {}. Expected owner/repo",
            url
        ))
    };

    if url.starts_with("https://") || url.starts_with("http://") {
        let parsed = url::Url::parse(url).map_err(|e| Error::Parse(e.to_string()))?;
        let path = parsed.path().trim_matches('/').trim_end_matches(".git");
        return split_owner_repo(path)
            .ok_or_else(|| Error::Parse(format!("Invalid GitHub URL path: {}", path)));
    }

    if let Some(rest) = url.strip_prefix("git@") {
        let path = rest
            .split_once(':')
            .map(|(_, path)| path.trim_end_matches(".git"))
            .ok_or_else(|| Error::Parse(format!("Invalid SSH URL: {}", url)))?;
        return split_owner_repo(path)
            .ok_or_else(|| Error::Parse(format!("Invalid SSH URL: {}", url)));
    }

    if url.contains(':') {
        return Err(invalid());
    }

    match url.split('/').collect::<Vec<_>>().as_slice() {
        [owner, repo] if !owner.is_empty() && !repo.is_empty() => Ok((
            owner.to_string(),
            repo.trim_end_matches(".git").to_string(),
        )),
        _ => Err(invalid()),
    }
}

fn split_owner_repo(path: &str) -> Option<(String, String)> {
    let mut parts = path.split('/');
    match (parts.next(), parts.next()) {
        (Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty() => {
            Some((owner.to_string(), repo.to_string()))
        }
        _ => None,
    }
}
