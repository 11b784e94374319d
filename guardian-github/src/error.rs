//! Error types for GitHub operations

use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub operations
#[derive(Error, Debug)]
pub enum Error {
    /// GitHub API error
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// Authentication error
    #[error("GitHub authentication error: {0}")]
    Auth(String),

    /// Repository, user or commit not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded
    #[error("GitHub rate limit exceeded: {0}")]
    RateLimited(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Classify an octocrab error by the message GitHub sent back
    pub(crate) fn from_api(err: octocrab::Error, what: impl FnOnce() -> String) -> Self {
        match err {
            octocrab::Error::GitHub { source, .. } if source.message.contains("Not Found") => {
                Error::NotFound(what())
            }
            octocrab::Error::GitHub { source, .. }
                if source.message.to_lowercase().contains("rate limit") =>
            {
                Error::RateLimited(source.message)
            }
            octocrab::Error::GitHub { source, .. }
                if source.message.contains("Bad credentials") =>
            {
                Error::Auth("Invalid GitHub token".to_string())
            }
            other => Error::Api(other),
        }
    }
}

impl From<Error> for guardian_core::Error {
    fn from(err: Error) -> Self {
        guardian_core::Error::SourceControl(err.to_string())
    }
}
