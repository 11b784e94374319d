//! Concurrent fan-out over several upstream services
//!
//! Every target is resolved through [`crate::endpoint::EndpointResolver`]
//! and the results are combined under a [`FanoutPolicy`].

pub mod aggregator;
pub mod insights;

pub use aggregator::{
    FanoutAggregator, FanoutPolicy, FanoutRequest, FanoutResult, FanoutTarget, LegFailure,
    LegSuccess,
};
pub use insights::{InsightAggregator, DASHBOARD_METRIC, INSIGHT_METRIC};
