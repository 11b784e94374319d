//! Guardian Core - cross-service orchestration for CodeGuardian
//!
//! This crate resolves possibly-stale service URLs into working endpoints,
//! fans requests out to several upstream services concurrently, and drives
//! the fetch / review / notify pipeline for code reviews.

pub mod config;
pub mod endpoint;
pub mod error;
pub mod fanout;
pub mod git;
pub mod review;
pub mod secrets;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
pub use endpoint::{EndpointResolver, ServiceTarget};
pub use error::{Error, ProbeError, Result};
pub use fanout::{FanoutAggregator, FanoutPolicy, InsightAggregator};
pub use review::{ReviewOutcome, ReviewPipeline, ReviewRequest};
pub use secrets::Secrets;
