//! Service targets and deterministic candidate URL generation

use serde::{Deserialize, Serialize};
use url::Url;

/// Paths tried against the base of a configured URL, in preference order
pub const CANDIDATE_SUFFIXES: &[&str] = &[
    "/api/review",
    "/api/reviews",
    "/review",
    "/reviews",
    "/health",
    "/",
];

/// A logical upstream service
///
/// The base URL is kept exactly as configured; resolution produces a
/// transient working URL per call and never rewrites it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTarget {
    name: String,
    base_url: String,
}

impl ServiceTarget {
    /// Create a new service target
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
        }
    }

    /// Logical name of the service
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base URL as configured
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether a base URL is present at all
    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty()
    }

    /// Candidate URLs for this target
    pub fn candidates(&self) -> Vec<String> {
        candidate_urls(&self.base_url)
    }
}

/// Build the ordered candidate list for a configured URL
///
/// The input itself comes first, followed by [`CANDIDATE_SUFFIXES`] joined to
/// the URL's base (`scheme://host[:port]`) for any scheme. Input that does not
/// parse as a URL with a host yields only itself.
pub fn candidate_urls(configured: &str) -> Vec<String> {
    let base = match Url::parse(configured) {
        Ok(url) if url.has_host() => base_of(&url),
        _ => return vec![configured.to_string()],
    };

    std::iter::once(configured.to_string())
        .chain(
            CANDIDATE_SUFFIXES
                .iter()
                .map(|suffix| format!("{}{}", base, suffix)),
        )
        .collect()
}

/// `scheme://host[:port]` of a URL known to have a host
///
/// `host_str` keeps IPv6 literals bracketed and `port` omits the default
/// port of special schemes.
fn base_of(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_fixed_order() {
        let candidates = candidate_urls("http://localhost:5002/api/ai/review");
        assert_eq!(
            candidates,
            vec![
                "http://localhost:5002/api/ai/review",
                "http://localhost:5002/api/review",
                "http://localhost:5002/api/reviews",
                "http://localhost:5002/review",
                "http://localhost:5002/reviews",
                "http://localhost:5002/health",
                "http://localhost:5002/",
            ]
        );
    }

    #[test]
    fn test_candidates_drop_path_and_query() {
        let candidates = candidate_urls("https://metrics.internal/v1/metrics?team=core");
        assert_eq!(candidates.len(), 7);
        assert_eq!(candidates[0], "https://metrics.internal/v1/metrics?team=core");
        assert_eq!(candidates[1], "https://metrics.internal/api/review");
        assert_eq!(candidates[6], "https://metrics.internal/");
    }

    #[test]
    fn test_candidates_bare_host_keeps_duplicate_root() {
        // The configured URL is always first even when it equals a later candidate
        let candidates = candidate_urls("http://example.com/");
        assert_eq!(candidates.len(), 7);
        assert_eq!(candidates[0], candidates[6]);
    }

    #[test]
    fn test_candidates_for_non_http_scheme() {
        let candidates = candidate_urls("grpc://svc.local:5000/insights");
        assert_eq!(
            candidates,
            vec![
                "grpc://svc.local:5000/insights",
                "grpc://svc.local:5000/api/review",
                "grpc://svc.local:5000/api/reviews",
                "grpc://svc.local:5000/review",
                "grpc://svc.local:5000/reviews",
                "grpc://svc.local:5000/health",
                "grpc://svc.local:5000/",
            ]
        );

        let candidates = candidate_urls("redis://cache.internal/0");
        assert_eq!(candidates[1], "redis://cache.internal/api/review");
    }

    #[test]
    fn test_candidates_keep_ipv6_brackets_and_drop_default_port() {
        let candidates = candidate_urls("http://[::1]:8080/x");
        assert_eq!(candidates[1], "http://[::1]:8080/api/review");

        let candidates = candidate_urls("https://svc.local:443/x");
        assert_eq!(candidates[5], "https://svc.local/health");
    }

    #[test]
    fn test_unparseable_input_is_sole_candidate() {
        assert_eq!(candidate_urls("localhost:5003"), vec!["localhost:5003"]);
        assert_eq!(candidate_urls("not a url"), vec!["not a url"]);
        assert_eq!(candidate_urls("/api/metrics"), vec!["/api/metrics"]);
    }

    #[test]
    fn test_candidates_are_deterministic() {
        let target = ServiceTarget::new("ai-review", "http://10.0.0.4:8080/x");
        assert_eq!(target.candidates(), target.candidates());
        assert_eq!(target.base_url(), "http://10.0.0.4:8080/x");
    }

    #[test]
    fn test_is_configured() {
        assert!(ServiceTarget::new("a", "http://a").is_configured());
        assert!(!ServiceTarget::new("a", "").is_configured());
        assert!(!ServiceTarget::new("a", "   ").is_configured());
    }
}
