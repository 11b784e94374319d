//! Endpoint resolution for possibly-stale service URLs
//!
//! A configured base URL may point at the right host but the wrong path,
//! or be down entirely. [`EndpointResolver`] derives an ordered list of
//! candidate URLs from it and probes them in order, returning the first
//! one that answers.

pub mod candidates;
pub mod probe;
pub mod resolver;

pub use candidates::{candidate_urls, ServiceTarget, CANDIDATE_SUFFIXES};
pub use probe::{HttpProber, ProbeResponse, Prober};
pub use resolver::{EndpointResolver, ResolvedEndpoint};
