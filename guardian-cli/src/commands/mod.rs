//! CLI command implementations

pub mod insights;
pub mod resolve;
pub mod review;
pub mod source;

pub use insights::InsightsArgs;
pub use resolve::ResolveArgs;
pub use review::{ReviewArgs, ReviewCommitArgs};
pub use source::{CommitsArgs, PullsArgs, ReposArgs};

use std::sync::Arc;

use async_trait::async_trait;
use guardian_core::endpoint::HttpProber;
use guardian_core::services::{
    GeminiClient, HttpMetrics, HttpNotifier, LogMetrics, MetricsEmitter, MultiEmitter, Notifier,
    ReviewGenerator,
};
use guardian_core::{Config, EndpointResolver, ReviewPipeline, Secrets};
use guardian_github::GitHubClient;
use serde::Serialize;

/// Loaded settings plus the collaborator constructors every command shares
pub struct Context {
    pub config: Config,
    secrets: Secrets,
}

impl Context {
    pub fn new(config: Config, secrets: Secrets) -> Self {
        Self { config, secrets }
    }

    pub fn resolver(&self) -> anyhow::Result<EndpointResolver> {
        let prober = HttpProber::new(self.config.http.timeout)?;
        Ok(EndpointResolver::new(Arc::new(prober)))
    }

    /// Tracing log, plus the HTTP sink when one is configured
    pub fn metrics(&self) -> anyhow::Result<Arc<dyn MetricsEmitter>> {
        let mut emitter = MultiEmitter::new().with(Arc::new(LogMetrics));
        if let Some(url) = configured(&self.config.services.metrics_sink_url) {
            emitter = emitter.with(Arc::new(HttpMetrics::new(url, self.config.http.timeout)?));
        }
        Ok(Arc::new(emitter))
    }

    fn generator(&self) -> anyhow::Result<Arc<dyn ReviewGenerator>> {
        match self.secrets.gemini_api_key() {
            Some(key) => Ok(Arc::new(GeminiClient::new(&self.config.ai, key)?)),
            None => {
                tracing::warn!("GEMINI_API_KEY not set, reviews will use the fallback");
                Ok(Arc::new(MissingApiKey))
            }
        }
    }

    fn notifier(&self) -> anyhow::Result<Option<Arc<dyn Notifier>>> {
        match configured(&self.config.services.notification_url) {
            Some(url) => Ok(Some(Arc::new(HttpNotifier::new(
                url,
                self.config.http.timeout,
            )?))),
            None => Ok(None),
        }
    }

    pub fn pipeline(&self) -> anyhow::Result<ReviewPipeline> {
        let pipeline = ReviewPipeline::new(self.generator()?, self.metrics()?)
            .with_max_diff_chars(self.config.review.max_diff_chars);
        Ok(match self.notifier()? {
            Some(notifier) => pipeline.with_notifier(notifier),
            None => pipeline,
        })
    }

    pub fn github(&self) -> anyhow::Result<GitHubClient> {
        Ok(GitHubClient::from_secrets(&self.secrets)?)
    }
}

fn configured(url: &Option<String>) -> Option<&str> {
    url.as_deref().map(str::trim).filter(|u| !u.is_empty())
}

/// Stands in for the AI provider when no key is configured
struct MissingApiKey;

#[async_trait]
impl ReviewGenerator for MissingApiKey {
    async fn generate_review(&self, _prompt: &str) -> guardian_core::Result<String> {
        Err(guardian_core::Error::AiProvider(
            "GEMINI_API_KEY is not configured".to_string(),
        ))
    }
}

/// Write `value` to stdout as pretty JSON
pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
