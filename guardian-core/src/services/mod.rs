//! Collaborator boundaries
//!
//! The orchestration layer reaches every external system through one of the
//! traits below. Concrete clients are constructed by the caller and injected,
//! so tests substitute doubles.

pub mod ai;
pub mod metrics;
pub mod notify;
pub mod source;

pub use ai::{GeminiClient, ReviewGenerator};
pub use metrics::{
    HttpMetrics, LogMetrics, Metric, MetricUnit, MetricsEmitter, MultiEmitter, OutcomeEvent,
};
pub use notify::{HttpNotifier, NotificationEvent, Notifier};
pub use source::{short_sha, CommitSummary, SourceControl};
