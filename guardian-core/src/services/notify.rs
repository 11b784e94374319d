//! Notification collaborator

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Event published after a review completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub subject: String,
    pub message: String,
    /// Attribute values are always strings
    pub attributes: BTreeMap<String, String>,
}

impl NotificationEvent {
    /// Create an event with no attributes
    pub fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            message: message.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Add an attribute, coercing the value to a string
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.insert(key.into(), value.to_string());
        self
    }
}

/// Delivers notification events
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, event: &NotificationEvent) -> Result<()>;
}

/// Posts events as JSON to the notification service
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    client: reqwest::Client,
    url: String,
}

impl HttpNotifier {
    /// Create a notifier posting to `url` with a per-call timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send(&self, event: &NotificationEvent) -> Result<()> {
        debug!(url = %self.url, subject = %event.subject, "Sending notification");

        let response = self
            .client
            .post(&self.url)
            .json(event)
            .send()
            .await
            .map_err(|e| Error::NotificationDelivery(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response".to_string());
            return Err(Error::NotificationDelivery(format!(
                "notification service responded with {}: {}",
                status, text
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_attributes_are_coerced() {
        let event = NotificationEvent::new("s", "m")
            .with_attribute("score", 85)
            .with_attribute("fallback", false)
            .with_attribute("repo", "octo/hello");

        assert_eq!(event.attributes["score"], "85");
        assert_eq!(event.attributes["fallback"], "false");
        assert_eq!(event.attributes["repo"], "octo/hello");
    }

    #[tokio::test]
    async fn test_http_notifier_posts_event() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/notify"))
            .and(body_json(json!({
                "subject": "Code Review Completed for abc1234",
                "message": "done",
                "attributes": {"commit_id": "abc1234"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let notifier =
            HttpNotifier::new(format!("{}/notify", server.uri()), Duration::from_secs(2)).unwrap();
        let event = NotificationEvent::new("Code Review Completed for abc1234", "done")
            .with_attribute("commit_id", "abc1234");
        notifier.send(&event).await.unwrap();
    }

    #[tokio::test]
    async fn test_http_notifier_reports_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({"error": "Notification handling failed"})),
            )
            .mount(&server)
            .await;

        let notifier = HttpNotifier::new(server.uri(), Duration::from_secs(2)).unwrap();
        let err = notifier
            .send(&NotificationEvent::new("s", "m"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotificationDelivery(ref msg) if msg.contains("500")));
    }
}
