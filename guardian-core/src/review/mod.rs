//! Review pipeline: acquire code context, generate a review, notify
//!
//! Each stage is attempted exactly once per invocation. A failing AI
//! collaborator is replaced by a tagged fallback review, and notification
//! failures are logged without touching the result.

pub mod pipeline;
pub mod prompt;
pub mod request;
pub mod score;
pub mod state;

pub use pipeline::{notification_for, ReviewOutcome, ReviewPipeline, ReviewSource, REVIEW_METRIC};
pub use request::{truncate_chars, CodeContext, FileDiff, ReviewRequest, MAX_DIFF_CHARS};
pub use score::{compute_score, count_findings, FINDING_MARKERS};
pub use state::{PipelineStage, PipelineState};
