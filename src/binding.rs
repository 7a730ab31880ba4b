//! The Event Grid binding.
//!
//! [`AzureEventGrid`] ties the components together:
//!
//! - `init` resolves configuration once; it is read-only afterwards
//! - `read` validates the inbound fields, binds the listener, registers the
//!   event subscription, then serves deliveries until `close`
//! - `write` validates the outbound fields and publishes one payload
//!
//! # Example
//!
//! ```rust,ignore
//! use eventgrid_binding::{AzureEventGrid, HandlerError, Metadata, ReadResponse, WriteRequest};
//!
//! let mut binding = AzureEventGrid::new();
//! binding.init(
//!     Metadata::new("orders")
//!         .with_property("accessKey", "topic-key")
//!         .with_property("topicEndpoint", "https://orders.westus2-1.eventgrid.azure.net/api/events"),
//! )?;
//!
//! binding.write(WriteRequest::new(r#"{"specversion":"1.0","id":"1"}"#)).await?;
//! ```

use crate::bindings::{
    EventHandler, InputBinding, Metadata, OperationKind, OutputBinding, WriteRequest,
};
use crate::config::EventGridConfig;
use crate::error::{BindingError, ConfigError};
use crate::listener;
use crate::publisher::TopicPublisher;
use crate::subscription::{EventSubscription, SubscriptionRegistrar};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tokio_util::sync::CancellationToken;

const TRACING_TARGET: &str = "eventgrid_binding::binding";

/// State created by `init`.
#[derive(Debug)]
struct Initialized {
    config: EventGridConfig,
    client: reqwest::Client,
    registrar: OnceLock<SubscriptionRegistrar>,
}

/// Sends events to and receives events from Azure Event Grid.
///
/// # Thread Safety
///
/// After `init`, `read`, `write`, and `close` take `&self` and may be called
/// from different tasks. Shared state is the read-only configuration, the
/// pooled HTTP client, the cached management token, and the stop signal.
#[derive(Debug, Default)]
pub struct AzureEventGrid {
    state: Option<Initialized>,
    shutdown: Mutex<CancellationToken>,
}

// Verify AzureEventGrid is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AzureEventGrid>();
};

impl AzureEventGrid {
    /// Creates an uninitialized binding.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves configuration from the host's component definition.
    ///
    /// Required fields are not checked here; `read` and `write` check the
    /// fields of their own direction.
    ///
    /// # Errors
    ///
    /// - [`BindingError::Config`] if the property bag cannot be decoded
    /// - [`BindingError::Transport`] if the HTTP client cannot be built
    pub fn init(&mut self, metadata: Metadata) -> Result<(), BindingError> {
        let config = EventGridConfig::from_metadata(&metadata)?;
        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        tracing::debug!(
            target: TRACING_TARGET,
            component = config.name(),
            handshake_port = config.handshake_port(),
            event_subscription = config.event_subscription_name(),
            "Initialized EventGrid binding"
        );

        self.state = Some(Initialized {
            config,
            client,
            registrar: OnceLock::new(),
        });
        Ok(())
    }

    /// Returns the resolved configuration, once initialized.
    #[must_use]
    pub fn config(&self) -> Option<&EventGridConfig> {
        self.state.as_ref().map(|state| &state.config)
    }

    /// Registers the event subscription and serves deliveries to `handler`.
    ///
    /// Runs until [`close`](Self::close) is called. A `read` started after
    /// `close` serves normally until the next `close`.
    ///
    /// # Errors
    ///
    /// - [`BindingError::Config`] naming the first missing inbound field
    /// - [`BindingError::Listener`] if the handshake port cannot be bound
    /// - [`BindingError::Auth`], [`BindingError::Transport`], or
    ///   [`BindingError::Subscription`] if registration fails
    pub async fn read<H>(&self, handler: H) -> Result<(), BindingError>
    where
        H: EventHandler + 'static,
    {
        self.read_with(Arc::new(handler)).await
    }

    async fn read_with(&self, handler: Arc<dyn EventHandler>) -> Result<(), BindingError> {
        let shutdown = self.lock_shutdown().child_token();
        let state = self.state()?;
        let input = state.config.ensure_input()?;

        // Bound before registering so a port conflict fails before any remote change.
        let tcp = listener::bind(input.handshake_port).await?;

        state
            .registrar
            .get_or_init(|| SubscriptionRegistrar::from_settings(state.client.clone(), &input))
            .create_or_update(
                input.scope,
                input.event_subscription_name,
                &EventSubscription::webhook(input.subscriber_endpoint),
            )
            .await?;

        tracing::debug!(
            target: TRACING_TARGET,
            port = input.handshake_port,
            path = listener::EVENTS_PATH,
            "Listening for EventGrid events"
        );

        listener::serve(tcp, handler, shutdown).await?;
        Ok(())
    }

    /// Publishes one payload to the configured topic.
    ///
    /// # Errors
    ///
    /// - [`BindingError::Config`] if `accessKey` or `topicEndpoint` is missing
    /// - [`BindingError::Transport`] if the request could not be sent
    /// - [`BindingError::Publish`] if the topic does not answer `200 OK`
    pub async fn write(&self, request: WriteRequest) -> Result<(), BindingError> {
        let state = self.state()?;
        let output = state.config.ensure_output().map_err(|err| {
            tracing::error!(target: TRACING_TARGET, error = %err, "Invalid output configuration");
            err
        })?;

        TopicPublisher::from_settings(state.client.clone(), &output)
            .publish(request.data)
            .await
    }

    /// Stops every running `read`, letting in-flight deliveries finish.
    pub fn close(&self) {
        let previous = std::mem::take(&mut *self.lock_shutdown());
        previous.cancel();
    }

    fn lock_shutdown(&self) -> MutexGuard<'_, CancellationToken> {
        self.shutdown.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> Result<&Initialized, ConfigError> {
        self.state.as_ref().ok_or(ConfigError::NotInitialized)
    }
}

#[async_trait]
impl InputBinding for AzureEventGrid {
    async fn init(&mut self, metadata: Metadata) -> Result<(), BindingError> {
        Self::init(self, metadata)
    }

    async fn read(&self, handler: Arc<dyn EventHandler>) -> Result<(), BindingError> {
        self.read_with(handler).await
    }
}

#[async_trait]
impl OutputBinding for AzureEventGrid {
    async fn init(&mut self, metadata: Metadata) -> Result<(), BindingError> {
        Self::init(self, metadata)
    }

    async fn write(&self, request: WriteRequest) -> Result<(), BindingError> {
        Self::write(self, request).await
    }

    fn operations(&self) -> Vec<OperationKind> {
        vec![OperationKind::Create]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::{HandlerError, ReadResponse};

    fn noop(_: ReadResponse) -> Result<(), HandlerError> {
        Ok(())
    }

    #[tokio::test]
    async fn test_write_before_init_is_not_initialized() {
        let binding = AzureEventGrid::new();
        let result = binding.write(WriteRequest::new("{}")).await;
        assert!(matches!(
            result,
            Err(BindingError::Config(ConfigError::NotInitialized))
        ));
    }

    #[tokio::test]
    async fn test_read_before_init_is_not_initialized() {
        let binding = AzureEventGrid::new();
        let result = binding.read(noop).await;
        assert!(matches!(
            result,
            Err(BindingError::Config(ConfigError::NotInitialized))
        ));
    }

    #[test]
    fn test_init_applies_defaults() {
        let mut binding = AzureEventGrid::new();
        binding.init(Metadata::new("orders")).unwrap();

        let config = binding.config().unwrap();
        assert_eq!(config.handshake_port(), "8080");
        assert_eq!(config.event_subscription_name(), "orders");
    }

    #[test]
    fn test_init_rejects_undecodable_metadata() {
        let mut binding = AzureEventGrid::new();
        let result = binding.init(
            Metadata::new("orders").with_property("scope", serde_json::json!({"a": 1})),
        );
        assert!(matches!(
            result,
            Err(BindingError::Config(ConfigError::Decode { .. }))
        ));
    }

    #[tokio::test]
    async fn test_read_reports_first_missing_input_field() {
        let mut binding = AzureEventGrid::new();
        binding
            .init(Metadata::new("orders").with_property("tenantId", "tenant"))
            .unwrap();

        let error = binding.read(noop).await.unwrap_err();
        assert!(matches!(
            error,
            BindingError::Config(ConfigError::MissingField {
                field: "subscriptionId",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_write_reports_missing_access_key_with_component() {
        let mut binding = AzureEventGrid::new();
        binding
            .init(Metadata::new("orders-out").with_property("topicEndpoint", "https://topic"))
            .unwrap();

        let error = binding.write(WriteRequest::new("{}")).await.unwrap_err();
        assert_eq!(
            error.to_string(),
            "metadata field 'accessKey' is empty in EventGrid binding (orders-out)"
        );
    }

    #[test]
    fn test_operations_lists_create() {
        let binding = AzureEventGrid::new();
        assert_eq!(
            OutputBinding::operations(&binding),
            vec![OperationKind::Create]
        );
    }
}
