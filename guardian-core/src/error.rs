//! Error types for CodeGuardian

use thiserror::Error;

/// Result type alias for CodeGuardian operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for CodeGuardian operations
#[derive(Error, Debug)]
pub enum Error {
    /// The configured base URL is empty or missing; no probe was attempted
    #[error("Service '{service}' has no endpoint configured")]
    MisconfiguredEndpoint { service: String },

    /// Every candidate URL for a service failed at the transport level
    #[error("Service '{service}' unreachable after {attempts} attempt(s): {last_error}")]
    EndpointUnreachable {
        service: String,
        attempts: usize,
        last_error: ProbeError,
    },

    /// One leg of an all-or-nothing fanout failed
    #[error("Aggregation failed at target '{target}': {source}")]
    AggregationFailed {
        target: String,
        #[source]
        source: Box<Error>,
    },

    /// Neither a code snippet nor a list of files was supplied
    #[error("No code provided")]
    NoCodeProvided,

    /// AI provider error (recovered by the review pipeline)
    #[error("AI provider error: {0}")]
    AiProvider(String),

    /// Notification delivery error (logged, never surfaced by the pipeline)
    #[error("Notification delivery error: {0}")]
    NotificationDelivery(String),

    /// Source-control collaborator error
    #[error("Source control error: {0}")]
    SourceControl(String),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this is an input-validation failure (4xx-equivalent)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::NoCodeProvided | Error::MisconfiguredEndpoint { .. }
        )
    }
}

/// Failure of a single probe against one candidate URL
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// Connection refused, DNS failure, timeout, or similar
    #[error("{url}: {message}")]
    Transport { url: String, message: String },

    /// The server answered with a 5xx status
    #[error("{url}: server responded with status {status}")]
    ServerError { url: String, status: u16 },
}

impl ProbeError {
    /// Create a transport-level failure
    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        ProbeError::Transport {
            url: url.into(),
            message: message.into(),
        }
    }

    /// The URL that was probed
    pub fn url(&self) -> &str {
        match self {
            ProbeError::Transport { url, .. } | ProbeError::ServerError { url, .. } => url,
        }
    }
}
