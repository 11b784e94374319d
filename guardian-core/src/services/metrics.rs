//! Metrics collaborator
//!
//! Emission is fire-and-forget: [`MetricsEmitter::emit`] cannot fail from the
//! caller's point of view, and implementations log their own delivery errors.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::Result;

/// Unit attached to a metric value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricUnit {
    Count,
    Milliseconds,
}

impl std::fmt::Display for MetricUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricUnit::Count => write!(f, "Count"),
            MetricUnit::Milliseconds => write!(f, "Milliseconds"),
        }
    }
}

/// A single metric sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub value: f64,
    pub unit: MetricUnit,
}

impl Metric {
    /// A `Count` sample
    pub fn count(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            unit: MetricUnit::Count,
        }
    }

    /// A `Milliseconds` sample
    pub fn duration(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            value: duration.as_millis() as f64,
            unit: MetricUnit::Milliseconds,
        }
    }
}

/// Outcome of one aggregate or pipeline invocation
///
/// Produced once at the end of each call and turned into exactly one
/// success-or-failure counter plus one duration sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeEvent {
    /// Metric name prefix, e.g. `code_review`
    pub operation: String,
    pub success: bool,
    pub duration: Duration,
}

impl OutcomeEvent {
    pub fn new(operation: impl Into<String>, success: bool, duration: Duration) -> Self {
        Self {
            operation: operation.into(),
            success,
            duration,
        }
    }

    /// `<op>_success` or `<op>_failures`, then `<op>_duration`
    pub fn metrics(&self) -> [Metric; 2] {
        let counter = if self.success {
            format!("{}_success", self.operation)
        } else {
            format!("{}_failures", self.operation)
        };
        [
            Metric::count(counter, 1.0),
            Metric::duration(format!("{}_duration", self.operation), self.duration),
        ]
    }
}

/// Receives metric samples
#[async_trait]
pub trait MetricsEmitter: Send + Sync {
    /// Record a sample; must not fail the caller
    async fn emit(&self, metric: Metric);

    /// Record the samples for a finished invocation
    async fn emit_outcome(&self, outcome: &OutcomeEvent) {
        for metric in outcome.metrics() {
            self.emit(metric).await;
        }
    }
}

/// Writes metrics to the tracing log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMetrics;

#[async_trait]
impl MetricsEmitter for LogMetrics {
    async fn emit(&self, metric: Metric) {
        info!(
            metric = %metric.name,
            value = metric.value,
            unit = %metric.unit,
            "metric"
        );
    }
}

/// Posts metrics as JSON to a metrics sink
#[derive(Debug, Clone)]
pub struct HttpMetrics {
    client: reqwest::Client,
    url: String,
}

impl HttpMetrics {
    /// Create an emitter posting to `url` with a per-call timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl MetricsEmitter for HttpMetrics {
    async fn emit(&self, metric: Metric) {
        let result = self
            .client
            .post(&self.url)
            .json(&metric)
            .send()
            .await
            .and_then(|r| r.error_for_status());

        if let Err(e) = result {
            warn!(metric = %metric.name, error = %e, "Failed to push metric");
        }
    }
}

/// Forwards every sample to several emitters
#[derive(Clone, Default)]
pub struct MultiEmitter {
    emitters: Vec<Arc<dyn MetricsEmitter>>,
}

impl MultiEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an emitter
    pub fn with(mut self, emitter: Arc<dyn MetricsEmitter>) -> Self {
        self.emitters.push(emitter);
        self
    }
}

impl std::fmt::Debug for MultiEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiEmitter")
            .field("emitters", &self.emitters.len())
            .finish()
    }
}

#[async_trait]
impl MetricsEmitter for MultiEmitter {
    async fn emit(&self, metric: Metric) {
        for emitter in &self.emitters {
            emitter.emit(metric.clone()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingMetrics;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_outcome_metrics_success() {
        let event = OutcomeEvent::new("code_review", true, Duration::from_millis(1250));
        let [counter, duration] = event.metrics();
        assert_eq!(counter, Metric::count("code_review_success", 1.0));
        assert_eq!(duration.name, "code_review_duration");
        assert_eq!(duration.value, 1250.0);
        assert_eq!(duration.unit, MetricUnit::Milliseconds);
    }

    #[test]
    fn test_outcome_metrics_failure() {
        let event = OutcomeEvent::new("insight_aggregation", false, Duration::ZERO);
        assert_eq!(event.metrics()[0].name, "insight_aggregation_failures");
    }

    #[tokio::test]
    async fn test_multi_emitter_fans_out() {
        let a = Arc::new(RecordingMetrics::default());
        let b = Arc::new(RecordingMetrics::default());
        let multi = MultiEmitter::new().with(a.clone()).with(b.clone());

        multi
            .emit_outcome(&OutcomeEvent::new("dashboard", true, Duration::from_millis(3)))
            .await;

        assert_eq!(a.names(), vec!["dashboard_success", "dashboard_duration"]);
        assert_eq!(a.names(), b.names());
    }

    #[tokio::test]
    async fn test_http_metrics_posts_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/metrics"))
            .and(body_json(serde_json::json!({
                "name": "code_review_success",
                "value": 1.0,
                "unit": "Count"
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let emitter =
            HttpMetrics::new(format!("{}/metrics", server.uri()), Duration::from_secs(2)).unwrap();
        emitter.emit(Metric::count("code_review_success", 1.0)).await;
    }

    #[tokio::test]
    async fn test_http_metrics_swallows_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let emitter = HttpMetrics::new(server.uri(), Duration::from_secs(2)).unwrap();
        // completes without panicking or returning an error
        emitter.emit(Metric::count("x", 1.0)).await;
    }
}
