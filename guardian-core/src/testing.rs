//! In-memory collaborators shared by unit tests

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::endpoint::{ProbeResponse, Prober};
use crate::error::ProbeError;
use crate::review::FileDiff;
use crate::services::{
    CommitSummary, Metric, MetricsEmitter, NotificationEvent, Notifier, ReviewGenerator,
    SourceControl,
};
use crate::{Error, Result};

/// Prober answering only the URLs it was scripted with
#[derive(Default)]
pub struct ScriptedProber {
    answers: HashMap<String, (u16, Value)>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(self, url: &str, body: Value) -> Self {
        self.answer_with_status(url, 200, body)
    }

    pub fn answer_with_status(mut self, url: &str, status: u16, body: Value) -> Self {
        self.answers.insert(url.to_string(), (status, body));
        self
    }

    /// Sleep this long before every answer
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, url: &str) -> std::result::Result<ProbeResponse, ProbeError> {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.answers.get(url) {
            Some((status, _)) if *status >= 500 => Err(ProbeError::ServerError {
                url: url.to_string(),
                status: *status,
            }),
            Some((status, body)) => Ok(ProbeResponse {
                url: url.to_string(),
                status: *status,
                body: body.clone(),
            }),
            None => Err(ProbeError::transport(url, "connection refused")),
        }
    }
}

/// Remembers every metric emitted
#[derive(Default)]
pub struct RecordingMetrics {
    metrics: Mutex<Vec<Metric>>,
}

impl RecordingMetrics {
    pub fn names(&self) -> Vec<String> {
        self.metrics
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.name.clone())
            .collect()
    }
}

#[async_trait]
impl MetricsEmitter for RecordingMetrics {
    async fn emit(&self, metric: Metric) {
        self.metrics.lock().unwrap().push(metric);
    }
}

/// Remembers events, optionally rejecting them after recording
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<NotificationEvent>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            events: Mutex::default(),
            fail: true,
        }
    }

    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, event: &NotificationEvent) -> Result<()> {
        self.events.lock().unwrap().push(event.clone());
        if self.fail {
            return Err(Error::NotificationDelivery("topic not found".to_string()));
        }
        Ok(())
    }
}

/// Generator returning a canned reply or a canned failure
pub struct StubGenerator {
    reply: std::result::Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl StubGenerator {
    pub fn ok(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::default(),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            prompts: Mutex::default(),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReviewGenerator for StubGenerator {
    async fn generate_review(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(Error::AiProvider)
    }
}

/// Source with one fixed commit
pub struct StaticSource {
    files: Vec<FileDiff>,
}

impl StaticSource {
    pub fn new(files: Vec<FileDiff>) -> Self {
        Self { files }
    }
}

#[async_trait]
impl SourceControl for StaticSource {
    async fn list_commits(&self, _owner: &str, _repo: &str) -> Result<Vec<CommitSummary>> {
        Ok(vec![CommitSummary {
            sha: "feedfacecafe".to_string(),
            author: "octocat".to_string(),
            message: "Initial commit".to_string(),
            date: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            url: String::new(),
        }])
    }

    async fn commit_diff(&self, _owner: &str, _repo: &str, _sha: &str) -> Result<String> {
        Ok(self
            .files
            .iter()
            .map(|f| f.diff.clone())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    async fn commit_files(&self, _owner: &str, _repo: &str, _sha: &str) -> Result<Vec<FileDiff>> {
        Ok(self.files.clone())
    }
}

/// Source whose every call fails like a rate-limited API
pub struct FailingSource;

#[async_trait]
impl SourceControl for FailingSource {
    async fn list_commits(&self, _owner: &str, _repo: &str) -> Result<Vec<CommitSummary>> {
        Err(Error::SourceControl("API rate limit exceeded".to_string()))
    }

    async fn commit_diff(&self, _owner: &str, _repo: &str, _sha: &str) -> Result<String> {
        Err(Error::SourceControl("API rate limit exceeded".to_string()))
    }
}
