//! Configuration management for CodeGuardian
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (GUARDIAN_*)
//! 3. Config file (~/.config/codeguardian/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::endpoint::ServiceTarget;
use crate::{Error, Result};

/// Upstream service locations
///
/// Every URL may be stale or point at the wrong path; the resolver
/// probes candidate paths at call time and never writes back here.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// AI review service (source of AI insights)
    pub ai_review_url: Option<String>,
    /// Developer metrics service
    pub metrics_url: Option<String>,
    /// Notification service endpoint receiving review events
    pub notification_url: Option<String>,
    /// Where outcome metrics are posted; logged only when unset
    pub metrics_sink_url: Option<String>,
}

impl ServicesConfig {
    /// Target for the AI review service
    pub fn ai_review_target(&self) -> ServiceTarget {
        ServiceTarget::new("ai-review", self.ai_review_url.clone().unwrap_or_default())
    }

    /// Target for the metrics service
    pub fn metrics_target(&self) -> ServiceTarget {
        ServiceTarget::new("metrics", self.metrics_url.clone().unwrap_or_default())
    }
}

/// Network settings shared by probes and outbound posts
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-call network timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
        }
    }
}

/// AI reviewer settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AiConfig {
    /// Gemini model name
    pub model: String,
    /// Base URL of the Gemini REST API
    pub endpoint: String,
    /// Timeout for a single review generation
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Review pipeline settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Per-file diff cap applied when acquiring code context
    pub max_diff_chars: usize,
    /// Run the notify stage for plain reviews
    pub notify: bool,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            max_diff_chars: crate::review::MAX_DIFF_CHARS,
            notify: false,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Upstream services
    pub services: ServicesConfig,
    /// Network settings
    pub http: HttpConfig,
    /// AI reviewer settings
    pub ai: AiConfig,
    /// Review pipeline settings
    pub review: ReviewConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/codeguardian/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("codeguardian").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - GUARDIAN_AI_SERVICE_URL
    /// - GUARDIAN_METRICS_URL
    /// - GUARDIAN_NOTIFICATION_URL
    /// - GUARDIAN_METRICS_SINK_URL
    /// - GUARDIAN_HTTP_TIMEOUT (e.g. "3s")
    /// - GUARDIAN_AI_MODEL
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = var("GUARDIAN_AI_SERVICE_URL") {
            self.services.ai_review_url = Some(url);
        }
        if let Some(url) = var("GUARDIAN_METRICS_URL") {
            self.services.metrics_url = Some(url);
        }
        if let Some(url) = var("GUARDIAN_NOTIFICATION_URL") {
            self.services.notification_url = Some(url);
        }
        if let Some(url) = var("GUARDIAN_METRICS_SINK_URL") {
            self.services.metrics_sink_url = Some(url);
        }
        if let Some(timeout) = var("GUARDIAN_HTTP_TIMEOUT") {
            self.http.timeout = humantime::parse_duration(&timeout)
                .map_err(|e| {
                    Error::Config(format!("Invalid GUARDIAN_HTTP_TIMEOUT '{}': {}", timeout, e))
                })?;
        }
        if let Some(model) = var("GUARDIAN_AI_MODEL") {
            self.ai.model = model;
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, timeout: Option<Duration>) -> Self {
        if let Some(timeout) = timeout {
            self.http.timeout = timeout;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(path: Option<&Path>, timeout: Option<Duration>) -> Result<Self> {
        let base = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };
        Ok(base.with_env_overrides()?.with_cli_overrides(timeout))
    }
}
