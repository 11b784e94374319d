//! Sequential, short-circuiting candidate probing

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{ProbeResponse, Prober, ServiceTarget};
use crate::{Error, Result};

/// A working endpoint found for a target, together with what it returned
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedEndpoint {
    /// Logical service name
    pub service: String,
    /// The candidate that answered
    pub url: String,
    /// HTTP status of the answering candidate
    pub status: u16,
    /// Decoded response body
    pub payload: Value,
    /// Number of candidates tried, including the successful one
    pub attempts: usize,
}

/// Resolves a [`ServiceTarget`] to the first candidate URL that answers
#[derive(Clone)]
pub struct EndpointResolver {
    prober: Arc<dyn Prober>,
}

impl std::fmt::Debug for EndpointResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointResolver").finish_non_exhaustive()
    }
}

impl EndpointResolver {
    /// Create a resolver that probes through `prober`
    pub fn new(prober: Arc<dyn Prober>) -> Self {
        Self { prober }
    }

    /// Return the first working URL for `target`
    pub async fn resolve(&self, target: &ServiceTarget) -> Result<String> {
        Ok(self.resolve_and_fetch(target).await?.url)
    }

    /// Probe candidates in order and return the first answer
    ///
    /// Candidates after the first success are never contacted. An empty base
    /// URL fails with [`Error::MisconfiguredEndpoint`] before any network call.
    pub async fn resolve_and_fetch(&self, target: &ServiceTarget) -> Result<ResolvedEndpoint> {
        if !target.is_configured() {
            return Err(Error::MisconfiguredEndpoint {
                service: target.name().to_string(),
            });
        }

        let candidates = target.candidates();
        let mut last_error = None;

        for (idx, url) in candidates.iter().enumerate() {
            debug!(service = target.name(), url = %url, attempt = idx + 1, "Probing candidate");

            match self.prober.probe(url).await {
                Ok(ProbeResponse { url, status, body }) => {
                    info!(service = target.name(), url = %url, status, "Resolved endpoint");
                    return Ok(ResolvedEndpoint {
                        service: target.name().to_string(),
                        url,
                        status,
                        payload: body,
                        attempts: idx + 1,
                    });
                }
                Err(e) => {
                    warn!(service = target.name(), error = %e, "Candidate failed");
                    last_error = Some(e);
                }
            }
        }

        // candidates is never empty, so a failure was recorded
        let last_error = last_error.ok_or_else(|| {
            Error::Other(format!("No candidates attempted for '{}'", target.name()))
        })?;

        Err(Error::EndpointUnreachable {
            service: target.name().to_string(),
            attempts: candidates.len(),
            last_error,
        })
    }
}
