//! Insight aggregation and dashboard composition

use std::sync::Arc;

use serde_json::{Map, Value};

use super::{FanoutAggregator, FanoutPolicy, FanoutRequest, FanoutTarget};
use crate::config::ServicesConfig;
use crate::endpoint::EndpointResolver;
use crate::services::MetricsEmitter;
use crate::Result;

pub const INSIGHT_METRIC: &str = "insight_aggregation";
pub const DASHBOARD_METRIC: &str = "dashboard";

const SUCCESS_MESSAGE: &str = "Aggregated insights generated successfully";
const MESSAGE_KEY: &str = "message";
const ERRORS_KEY: &str = "errors";

/// Combines AI-review and metrics payloads into one response
#[derive(Debug, Clone)]
pub struct InsightAggregator {
    insights: FanoutAggregator,
    dashboard: FanoutAggregator,
}

impl InsightAggregator {
    pub fn new(resolver: EndpointResolver, metrics: Arc<dyn MetricsEmitter>) -> Self {
        Self {
            insights: FanoutAggregator::new(resolver.clone(), metrics.clone(), INSIGHT_METRIC),
            dashboard: FanoutAggregator::new(resolver, metrics, DASHBOARD_METRIC),
        }
    }

    /// The standard targets: AI review as `aiInsights`, metrics as `metrics`
    pub fn default_targets(services: &ServicesConfig) -> Vec<FanoutTarget> {
        vec![
            FanoutTarget::new(services.ai_review_target(), "aiInsights"),
            FanoutTarget::new(services.metrics_target(), "metrics"),
        ]
    }

    /// All-or-nothing aggregation
    ///
    /// Returns `{"message": ..., <key>: payload, ...}` with keys in caller
    /// order, or the failing target as [`crate::Error::AggregationFailed`].
    /// An output key of `message` is rejected as [`crate::Error::Config`].
    pub async fn aggregate_insights(&self, targets: Vec<FanoutTarget>) -> Result<Value> {
        let request = FanoutRequest::new(targets);
        request.check_output_keys(&[MESSAGE_KEY])?;

        let result = self
            .insights
            .aggregate(&request, FanoutPolicy::AllOrNothing)
            .await?;

        let mut body = Map::new();
        body.insert(MESSAGE_KEY.to_string(), Value::String(SUCCESS_MESSAGE.to_string()));
        body.extend(result.payloads());
        Ok(Value::Object(body))
    }

    /// Best-effort composition: `{<key>: payload, ..., "errors": {<key>: msg}}`
    ///
    /// An output key of `errors` is rejected as [`crate::Error::Config`].
    pub async fn dashboard(&self, targets: Vec<FanoutTarget>) -> Result<Value> {
        let request = FanoutRequest::new(targets);
        request.check_output_keys(&[ERRORS_KEY])?;

        let result = self
            .dashboard
            .aggregate(&request, FanoutPolicy::BestEffort)
            .await?;

        let mut body = result.payloads();
        body.insert(ERRORS_KEY.to_string(), Value::Object(result.errors()));
        Ok(Value::Object(body))
    }
}
