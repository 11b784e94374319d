//! Policy-driven fan-out aggregation

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::endpoint::{EndpointResolver, ServiceTarget};
use crate::services::{MetricsEmitter, OutcomeEvent};
use crate::{Error, Result};

/// How leg failures affect the aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FanoutPolicy {
    /// Any failing leg fails the whole call and discards the successes
    AllOrNothing,
    /// Successes and failures are reported side by side
    BestEffort,
}

/// One upstream plus the key its payload is stored under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanoutTarget {
    pub target: ServiceTarget,
    /// Must be unique within a request and must not collide with a key the
    /// caller adds to the merged body (`message`, `errors`). Violations are
    /// rejected with [`Error::Config`] before any leg is dispatched.
    pub output_key: String,
}

impl FanoutTarget {
    pub fn new(target: ServiceTarget, output_key: impl Into<String>) -> Self {
        Self {
            target,
            output_key: output_key.into(),
        }
    }
}

/// The set of upstreams queried for one aggregated response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanoutRequest {
    pub targets: Vec<FanoutTarget>,
}

impl FanoutRequest {
    pub fn new(targets: Vec<FanoutTarget>) -> Self {
        Self { targets }
    }

    /// Fail on a duplicate output key or one listed in `reserved`
    pub fn check_output_keys(&self, reserved: &[&str]) -> Result<()> {
        let mut seen = HashSet::new();
        for t in &self.targets {
            let key = t.output_key.as_str();
            if reserved.contains(&key) {
                return Err(Error::Config(format!(
                    "Output key '{}' of service '{}' is reserved",
                    key,
                    t.target.name()
                )));
            }
            if !seen.insert(key) {
                return Err(Error::Config(format!(
                    "Output key '{}' is used by more than one target",
                    key
                )));
            }
        }
        Ok(())
    }
}

/// A leg that resolved and returned a payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegSuccess {
    pub name: String,
    pub output_key: String,
    pub url: String,
    pub payload: Value,
}

/// A leg that could not be resolved
#[derive(Debug)]
pub struct LegFailure {
    pub name: String,
    pub output_key: String,
    pub error: Error,
}

/// Partitioned outcome of a fan-out, both halves in caller order
#[derive(Debug, Default)]
pub struct FanoutResult {
    pub succeeded: Vec<LegSuccess>,
    pub failed: Vec<LegFailure>,
}

impl FanoutResult {
    /// Whether every leg succeeded
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Successful payloads keyed by output key
    pub fn payloads(&self) -> serde_json::Map<String, Value> {
        self.succeeded
            .iter()
            .map(|leg| (leg.output_key.clone(), leg.payload.clone()))
            .collect()
    }

    /// Failure messages keyed by output key
    pub fn errors(&self) -> serde_json::Map<String, Value> {
        self.failed
            .iter()
            .map(|leg| (leg.output_key.clone(), Value::String(leg.error.to_string())))
            .collect()
    }
}

/// Dispatches every target concurrently and combines the results
#[derive(Clone)]
pub struct FanoutAggregator {
    resolver: EndpointResolver,
    metrics: Arc<dyn MetricsEmitter>,
    metric_prefix: String,
}

impl std::fmt::Debug for FanoutAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutAggregator")
            .field("metric_prefix", &self.metric_prefix)
            .finish_non_exhaustive()
    }
}

impl FanoutAggregator {
    pub fn new(
        resolver: EndpointResolver,
        metrics: Arc<dyn MetricsEmitter>,
        metric_prefix: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            metrics,
            metric_prefix: metric_prefix.into(),
        }
    }

    /// Resolve and fetch every target, then apply `policy`
    ///
    /// All legs run to completion whatever the policy. Under
    /// [`FanoutPolicy::AllOrNothing`] the first failed leg in caller order is
    /// returned as [`Error::AggregationFailed`]. One outcome metric is emitted
    /// per call, tagged as a failure if any leg failed. Duplicate output keys
    /// fail with [`Error::Config`] before anything is dispatched.
    pub async fn aggregate(
        &self,
        request: &FanoutRequest,
        policy: FanoutPolicy,
    ) -> Result<FanoutResult> {
        request.check_output_keys(&[])?;

        let start = Instant::now();
        debug!(
            targets = request.targets.len(),
            policy = ?policy,
            "Dispatching fanout"
        );

        let legs = request.targets.iter().map(|t| async move {
            (t, self.resolver.resolve_and_fetch(&t.target).await)
        });
        let settled = join_all(legs).await;

        let mut result = FanoutResult::default();
        for (t, outcome) in settled {
            match outcome {
                Ok(resolved) => result.succeeded.push(LegSuccess {
                    name: t.target.name().to_string(),
                    output_key: t.output_key.clone(),
                    url: resolved.url,
                    payload: resolved.payload,
                }),
                Err(error) => {
                    warn!(target = t.target.name(), error = %error, "Fanout leg failed");
                    result.failed.push(LegFailure {
                        name: t.target.name().to_string(),
                        output_key: t.output_key.clone(),
                        error,
                    });
                }
            }
        }

        let complete = result.is_complete();
        self.metrics
            .emit_outcome(&OutcomeEvent::new(
                self.metric_prefix.as_str(),
                complete,
                start.elapsed(),
            ))
            .await;

        info!(
            operation = %self.metric_prefix,
            succeeded = result.succeeded.len(),
            failed = result.failed.len(),
            "Fanout settled"
        );

        if policy == FanoutPolicy::AllOrNothing && !complete {
            let first = result.failed.swap_remove(0);
            return Err(Error::AggregationFailed {
                target: first.name,
                source: Box::new(first.error),
            });
        }

        Ok(result)
    }
}
