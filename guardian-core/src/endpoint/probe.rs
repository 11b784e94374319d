//! Probing a single candidate URL

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ProbeError;
use crate::Result;

/// A response that qualified a candidate as working
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResponse {
    /// URL that answered
    pub url: String,
    /// HTTP status code (2xx-4xx)
    pub status: u16,
    /// Body decoded as JSON, or wrapped as a JSON string when it isn't JSON
    pub body: Value,
}

impl ProbeResponse {
    /// Build a response, decoding the raw body
    pub fn new(url: impl Into<String>, status: u16, raw_body: &str) -> Self {
        let body = if raw_body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(raw_body).unwrap_or_else(|_| Value::String(raw_body.to_string()))
        };

        Self {
            url: url.into(),
            status,
            body,
        }
    }
}

/// Issues one idempotent GET against a candidate URL
///
/// Implementations must only ever perform reads.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe `url`; any 2xx-4xx answer is a success
    async fn probe(&self, url: &str) -> std::result::Result<ProbeResponse, ProbeError>;
}

/// reqwest-backed prober with a per-call timeout
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    /// Create a prober whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("codeguardian/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &str) -> std::result::Result<ProbeResponse, ProbeError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProbeError::transport(url, e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(ProbeError::ServerError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| ProbeError::transport(url, format!("failed to read body: {}", e)))?;

        Ok(ProbeResponse::new(url, status.as_u16(), &text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_body_decoding() {
        let r = ProbeResponse::new("u", 200, r#"{"developer":"ana","commits":3}"#);
        assert_eq!(r.body, json!({"developer": "ana", "commits": 3}));

        let r = ProbeResponse::new("u", 200, "AI Review Service running");
        assert_eq!(r.body, json!("AI Review Service running"));

        let r = ProbeResponse::new("u", 204, "");
        assert_eq!(r.body, Value::Null);
    }

    #[tokio::test]
    async fn test_http_probe_accepts_client_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/review"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
            .mount(&server)
            .await;

        let prober = HttpProber::new(Duration::from_secs(2)).unwrap();
        let url = format!("{}/api/review", server.uri());
        let response = prober.probe(&url).await.unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(response.body, json!("not here"));
    }

    #[tokio::test]
    async fn test_http_probe_rejects_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let prober = HttpProber::new(Duration::from_secs(2)).unwrap();
        let err = prober.probe(&server.uri()).await.unwrap_err();
        assert!(matches!(err, ProbeError::ServerError { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_http_probe_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let prober = HttpProber::new(Duration::from_millis(50)).unwrap();
        let err = prober.probe(&server.uri()).await.unwrap_err();
        assert!(matches!(err, ProbeError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_http_probe_connection_refused() {
        // Port 9 (discard) is closed on test hosts
        let prober = HttpProber::new(Duration::from_millis(500)).unwrap();
        let err = prober.probe("http://127.0.0.1:9/health").await.unwrap_err();
        assert_eq!(err.url(), "http://127.0.0.1:9/health");
    }
}
