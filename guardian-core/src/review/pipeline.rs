//! Three-stage review orchestration

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{info, warn};

use super::prompt::{build_prompt, fallback_review};
use super::{
    compute_score, CodeContext, PipelineStage, PipelineState, ReviewRequest, MAX_DIFF_CHARS,
};
use crate::services::{
    short_sha, MetricsEmitter, NotificationEvent, Notifier, OutcomeEvent, ReviewGenerator,
    SourceControl,
};
use crate::Result;

/// Metric prefix for review invocations
pub const REVIEW_METRIC: &str = "code_review";

/// Where the review content came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewSource {
    Ai,
    Fallback,
}

impl std::fmt::Display for ReviewSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewSource::Ai => write!(f, "ai"),
            ReviewSource::Fallback => write!(f, "fallback"),
        }
    }
}

/// Result handed back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub content: String,
    /// 0-100, see [`compute_score`]
    pub score: u8,
    pub source: ReviewSource,
    pub duration_ms: u64,
}

impl ReviewOutcome {
    /// Whether the fallback review was used
    pub fn is_fallback(&self) -> bool {
        self.source == ReviewSource::Fallback
    }
}

/// Fetch code, generate a review, optionally notify
///
/// Collaborators are injected at construction. The pipeline holds no state
/// across invocations.
#[derive(Clone)]
pub struct ReviewPipeline {
    generator: Arc<dyn ReviewGenerator>,
    metrics: Arc<dyn MetricsEmitter>,
    notifier: Option<Arc<dyn Notifier>>,
    max_diff_chars: usize,
}

impl std::fmt::Debug for ReviewPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewPipeline")
            .field("max_diff_chars", &self.max_diff_chars)
            .field("has_notifier", &self.notifier.is_some())
            .finish_non_exhaustive()
    }
}

impl ReviewPipeline {
    /// Create a pipeline without a notifier
    pub fn new(generator: Arc<dyn ReviewGenerator>, metrics: Arc<dyn MetricsEmitter>) -> Self {
        Self {
            generator,
            metrics,
            notifier: None,
            max_diff_chars: MAX_DIFF_CHARS,
        }
    }

    /// Set the notifier used by the notify stage
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Override the per-file diff cap
    pub fn with_max_diff_chars(mut self, max: usize) -> Self {
        self.max_diff_chars = max;
        self
    }

    /// Review a request without notifying
    pub async fn run(&self, request: &ReviewRequest) -> Result<ReviewOutcome> {
        self.run_with(request, false).await
    }

    /// Review a request, then run the notify stage when a notifier is set
    pub async fn run_and_notify(&self, request: &ReviewRequest) -> Result<ReviewOutcome> {
        self.run_with(request, true).await
    }

    async fn run_with(&self, request: &ReviewRequest, notify: bool) -> Result<ReviewOutcome> {
        let start = Instant::now();
        let result = self.execute(request, notify, start).await;
        self.report(result.is_ok(), start).await;
        result
    }

    /// Review a commit fetched from a source-control collaborator
    ///
    /// Failure to fetch the diff is a stage failure and is returned; the
    /// notify stage always runs when a notifier is set.
    pub async fn review_commit(
        &self,
        source: &dyn SourceControl,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> Result<ReviewOutcome> {
        let start = Instant::now();

        let result = match source.commit_files(owner, repo, sha).await {
            Ok(files) => {
                info!(owner, repo, sha, files = files.len(), "Fetched commit diff");
                let request = ReviewRequest::commit(format!("{}/{}", owner, repo), sha, files);
                self.execute(&request, true, start).await
            }
            Err(e) => {
                warn!(owner, repo, sha, error = %e, "Failed to fetch commit diff");
                Err(e)
            }
        };

        self.report(result.is_ok(), start).await;
        result
    }

    async fn execute(
        &self,
        request: &ReviewRequest,
        notify: bool,
        start: Instant,
    ) -> Result<ReviewOutcome> {
        let mut state = PipelineState::new();

        state.advance(PipelineStage::AcquiringContext);
        let context = match CodeContext::acquire(request, self.max_diff_chars) {
            Ok(context) => context,
            Err(e) => {
                state.advance(PipelineStage::Failed);
                return Err(e);
            }
        };

        state.advance(PipelineStage::Reviewing);
        let prompt = build_prompt(&context);
        let (content, source) = match self.generator.generate_review(&prompt).await {
            Ok(text) => {
                state.advance(PipelineStage::Succeeded);
                (text, ReviewSource::Ai)
            }
            Err(e) => {
                warn!(error = %e, "AI review unavailable, using fallback review");
                state.advance(PipelineStage::FallenBack);
                (fallback_review(context.file_count()), ReviewSource::Fallback)
            }
        };

        let outcome = ReviewOutcome {
            score: compute_score(&content),
            content,
            source,
            duration_ms: elapsed_ms(start),
        };

        if notify {
            if let Some(notifier) = &self.notifier {
                state.advance(PipelineStage::Notifying);
                let event = notification_for(request, &outcome);
                if let Err(e) = notifier.send(&event).await {
                    warn!(error = %e, subject = %event.subject, "Notification failed");
                }
            }
        }

        state.advance(PipelineStage::Done);
        info!(
            source = %outcome.source,
            score = outcome.score,
            duration_ms = outcome.duration_ms,
            "Review complete"
        );

        Ok(outcome)
    }

    async fn report(&self, success: bool, start: Instant) {
        let event = OutcomeEvent::new(REVIEW_METRIC, success, start.elapsed());
        self.metrics.emit_outcome(&event).await;
    }
}

/// Build the event summarizing a finished review
pub fn notification_for(request: &ReviewRequest, outcome: &ReviewOutcome) -> NotificationEvent {
    let event = if request.commit_id.is_empty() {
        NotificationEvent::new(
            "Code Review Completed",
            "AI Review completed for code snippet",
        )
    } else {
        NotificationEvent::new(
            format!("Code Review Completed for {}", short_sha(&request.commit_id)),
            format!("AI Review completed for commit {}", request.commit_id),
        )
        .with_attribute("commit_id", &request.commit_id)
    };

    let event = if request.repo.is_empty() {
        event
    } else {
        event.with_attribute("repo", &request.repo)
    };

    event
        .with_attribute("score", outcome.score)
        .with_attribute("source", outcome.source)
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
