//! Outbound publishing to a topic endpoint.
//!
//! One call is one `POST`: the payload is sent verbatim with the cloud-events
//! media type and the topic's shared access key. There is no retry and no
//! batching.
//!
//! # Example
//!
//! ```rust,ignore
//! use eventgrid_binding::publisher::TopicPublisher;
//! use eventgrid_binding::AccessKey;
//!
//! let publisher = TopicPublisher::new(
//!     reqwest::Client::new(),
//!     "https://orders.westus2-1.eventgrid.azure.net/api/events",
//!     AccessKey::new("topic-key"),
//! );
//! publisher.publish(br#"{"specversion":"1.0","id":"1"}"#.to_vec()).await?;
//! ```

mod errors;

pub use errors::PublishError;

use crate::config::{AccessKey, OutputSettings};
use crate::error::BindingError;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use std::time::Duration;

/// Media type of published payloads.
pub const CLOUD_EVENTS_CONTENT_TYPE: &str = "application/cloudevents+json";

/// Header carrying the topic access key.
pub const ACCESS_KEY_HEADER: &str = "aeg-sas-key";

/// Timeout applied to each publish request.
pub const PUBLISH_TIMEOUT: Duration = Duration::from_secs(10);

const TRACING_TARGET: &str = "eventgrid_binding::publisher";

/// Posts payloads to one topic endpoint.
///
/// Cloning is cheap; clones share the underlying connection pool.
///
/// # Thread Safety
///
/// `TopicPublisher` is `Send + Sync`.
#[derive(Clone, Debug)]
pub struct TopicPublisher {
    client: reqwest::Client,
    topic_endpoint: String,
    access_key: AccessKey,
}

// Verify TopicPublisher is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TopicPublisher>();
};

impl TopicPublisher {
    /// Creates a publisher for `topic_endpoint` using a shared `client`.
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        topic_endpoint: impl Into<String>,
        access_key: AccessKey,
    ) -> Self {
        Self {
            client,
            topic_endpoint: topic_endpoint.into(),
            access_key,
        }
    }

    /// Creates a publisher from validated outbound settings.
    #[must_use]
    pub fn from_settings(client: reqwest::Client, settings: &OutputSettings<'_>) -> Self {
        Self::new(
            client,
            settings.topic_endpoint,
            settings.access_key.clone(),
        )
    }

    /// Returns the topic endpoint.
    #[must_use]
    pub fn topic_endpoint(&self) -> &str {
        &self.topic_endpoint
    }

    /// Publishes `payload` to the topic.
    ///
    /// # Errors
    ///
    /// - [`BindingError::Transport`] if the request could not be sent
    /// - [`BindingError::Publish`] if the endpoint does not answer `200 OK`
    pub async fn publish(&self, payload: Vec<u8>) -> Result<(), BindingError> {
        let response = self
            .client
            .post(&self.topic_endpoint)
            .header(CONTENT_TYPE, CLOUD_EVENTS_CONTENT_TYPE)
            .header(ACCESS_KEY_HEADER, self.access_key.as_ref())
            .timeout(PUBLISH_TIMEOUT)
            .body(payload)
            .send()
            .await
            .map_err(|err| {
                tracing::error!(
                    target: TRACING_TARGET,
                    endpoint = %self.topic_endpoint,
                    error = %err,
                    "Failed to send event"
                );
                err
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let message = response.text().await?;
            tracing::error!(
                target: TRACING_TARGET,
                endpoint = %self.topic_endpoint,
                status = status.as_u16(),
                body = %message,
                "Topic rejected event"
            );
            return Err(PublishError {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn publisher(endpoint: String) -> TopicPublisher {
        TopicPublisher::new(
            reqwest::Client::new(),
            endpoint,
            AccessKey::new("topic-key"),
        )
    }

    #[tokio::test]
    async fn test_publish_sends_headers_and_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/events"))
            .and(header("content-type", CLOUD_EVENTS_CONTENT_TYPE))
            .and(header("aeg-sas-key", "topic-key"))
            .and(body_string(r#"{"id":"1"}"#))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = publisher(format!("{}/api/events", mock_server.uri()))
            .publish(br#"{"id":"1"}"#.to_vec())
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_non_ok_status_maps_to_publish_error_with_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
            .mount(&mock_server)
            .await;

        let error = publisher(mock_server.uri())
            .publish(b"{}".to_vec())
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "denied");
        match error {
            BindingError::Publish(PublishError { status, .. }) => assert_eq!(status, 403),
            other => panic!("expected Publish error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_other_success_codes_are_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202).set_body_string("accepted"))
            .mount(&mock_server)
            .await;

        let result = publisher(mock_server.uri()).publish(b"{}".to_vec()).await;

        assert!(matches!(result, Err(BindingError::Publish(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_maps_to_transport_error() {
        let result = publisher("http://127.0.0.1:1/api/events".to_string())
            .publish(b"{}".to_vec())
            .await;

        assert!(matches!(result, Err(BindingError::Transport(_))));
    }
}
