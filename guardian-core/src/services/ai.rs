//! AI-review collaborator

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::AiConfig;
use crate::{Error, Result};

/// Turns a prompt into review text
///
/// Any failure (timeout, quota, malformed response) must come back as an
/// error quickly; the review pipeline substitutes a fallback review.
#[async_trait]
pub trait ReviewGenerator: Send + Sync {
    async fn generate_review(&self, prompt: &str) -> Result<String>;
}

/// Gemini `generateContent` REST client
pub struct GeminiClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a client for the configured model
    pub fn new(config: &AiConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            url: format!(
                "{}/models/{}:generateContent",
                config.endpoint.trim_end_matches('/'),
                config.model
            ),
            api_key: api_key.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[async_trait]
impl ReviewGenerator for GeminiClient {
    async fn generate_review(&self, prompt: &str) -> Result<String> {
        debug!(url = %self.url, prompt_chars = prompt.chars().count(), "Requesting review");

        let payload = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        });

        let response = self
            .client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::AiProvider(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::AiProvider(format!("Gemini API error {}: {}", status, body)));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::AiProvider(format!("malformed response: {}", e)))?;

        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(Error::AiProvider("empty response".to_string()));
        }

        Ok(text)
    }
}
