//! Integration tests for publishing through the binding's `write`.

use eventgrid_binding::{AzureEventGrid, BindingError, Metadata, WriteRequest};
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn output_binding(topic_endpoint: &str) -> AzureEventGrid {
    let mut binding = AzureEventGrid::new();
    binding
        .init(
            Metadata::new("orders-out")
                .with_property("accessKey", "topic-key")
                .with_property("topicEndpoint", topic_endpoint),
        )
        .unwrap();
    binding
}

#[tokio::test]
async fn test_write_succeeds_when_topic_returns_200() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/events"))
        .and(header("content-type", "application/cloudevents+json"))
        .and(header("aeg-sas-key", "topic-key"))
        .and(body_string(r#"{"specversion":"1.0","id":"1"}"#))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let binding = output_binding(&format!("{}/api/events", mock_server.uri()));
    let result = binding
        .write(WriteRequest::new(r#"{"specversion":"1.0","id":"1"}"#))
        .await;

    assert!(result.is_ok(), "{result:?}");
}

#[tokio::test]
async fn test_write_returns_response_body_when_topic_rejects() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
        .mount(&mock_server)
        .await;

    let binding = output_binding(&mock_server.uri());
    let error = binding.write(WriteRequest::new("{}")).await.unwrap_err();

    assert!(matches!(error, BindingError::Publish(_)));
    assert_eq!(error.to_string(), "denied");
}

#[tokio::test]
async fn test_concurrent_writes_share_one_binding() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(8)
        .mount(&mock_server)
        .await;

    let binding = std::sync::Arc::new(output_binding(&mock_server.uri()));

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let binding = std::sync::Arc::clone(&binding);
            tokio::spawn(async move {
                binding
                    .write(WriteRequest::new(format!(r#"{{"id":"{i}"}}"#)))
                    .await
            })
        })
        .collect();

    for task in tasks {
        assert!(task.await.unwrap().is_ok());
    }
}

#[tokio::test]
async fn test_write_without_output_fields_fails_before_sending() {
    let mut binding = AzureEventGrid::new();
    binding.init(Metadata::new("orders-out")).unwrap();

    let error = binding.write(WriteRequest::new("{}")).await.unwrap_err();

    assert!(matches!(error, BindingError::Config(_)));
    assert!(error.to_string().contains("accessKey"));
    assert!(error.to_string().contains("orders-out"));
}
