//! Configuration for the Event Grid binding.
//!
//! This module resolves the host's untyped property bag into a typed,
//! immutable [`EventGridConfig`].
//!
//! # Overview
//!
//! - [`EventGridConfig`]: The resolved configuration record
//! - [`EventGridConfigBuilder`]: A builder for constructing [`EventGridConfig`] instances
//! - [`InputSettings`] / [`OutputSettings`]: Validated views for each direction
//! - [`ClientSecret`] / [`AccessKey`]: Secret newtypes with masked debug output
//!
//! # Lazy Validation
//!
//! Resolution applies defaults but does not check required fields. A component
//! used only for publishing need not carry subscription credentials, and vice
//! versa. Each direction validates its own fields when it is first used, via
//! [`EventGridConfig::ensure_input`] and [`EventGridConfig::ensure_output`].
//!
//! # Example
//!
//! ```rust
//! use eventgrid_binding::{EventGridConfig, Metadata};
//!
//! let metadata = Metadata::new("orders")
//!     .with_property("accessKey", "key")
//!     .with_property("topicEndpoint", "https://orders.westus2-1.eventgrid.azure.net/api/events");
//!
//! let config = EventGridConfig::from_metadata(&metadata).unwrap();
//! assert_eq!(config.handshake_port(), "8080");
//! assert_eq!(config.event_subscription_name(), "orders");
//! assert!(config.ensure_output().is_ok());
//! ```

mod newtypes;

pub use newtypes::{AccessKey, ClientSecret};

use crate::bindings::Metadata;
use crate::error::ConfigError;
use serde_json::Value;

/// Port the listener binds when `handshakePort` is not supplied.
pub const DEFAULT_HANDSHAKE_PORT: &str = "8080";

/// Authority host used for the client-credentials token request.
pub const DEFAULT_ACTIVE_DIRECTORY_ENDPOINT: &str = "https://login.microsoftonline.com";

/// Base URL of the resource management API.
pub const DEFAULT_RESOURCE_MANAGER_ENDPOINT: &str = "https://management.azure.com";

/// Property keys read from the host's property bag.
pub const PROPERTY_KEYS: [&str; 12] = [
    "tenantId",
    "subscriptionId",
    "clientId",
    "clientSecret",
    "subscriberEndpoint",
    "handshakePort",
    "scope",
    "eventSubscriptionName",
    "accessKey",
    "topicEndpoint",
    "activeDirectoryEndpoint",
    "resourceManagerEndpoint",
];

/// Resolved configuration of one Event Grid binding component.
///
/// Created once by `init` and read by every later call. All fields are
/// read-only after construction.
///
/// # Thread Safety
///
/// `EventGridConfig` is `Clone`, `Send`, and `Sync`.
#[derive(Clone, Debug)]
pub struct EventGridConfig {
    name: String,
    tenant_id: Option<String>,
    subscription_id: Option<String>,
    client_id: Option<String>,
    client_secret: Option<ClientSecret>,
    subscriber_endpoint: Option<String>,
    handshake_port: String,
    scope: Option<String>,
    event_subscription_name: String,
    access_key: Option<AccessKey>,
    topic_endpoint: Option<String>,
    active_directory_endpoint: String,
    resource_manager_endpoint: String,
}

// Verify EventGridConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<EventGridConfig>();
};

/// Inbound fields, all present, as borrowed from an [`EventGridConfig`].
#[derive(Debug, Clone, Copy)]
pub struct InputSettings<'a> {
    /// Directory (tenant) of the service principal.
    pub tenant_id: &'a str,
    /// Subscription holding the subscribed resource.
    pub subscription_id: &'a str,
    /// Application (client) id of the service principal.
    pub client_id: &'a str,
    /// Secret of the service principal.
    pub client_secret: &'a ClientSecret,
    /// Public URL of this listener that Event Grid delivers to.
    pub subscriber_endpoint: &'a str,
    /// Port the listener binds.
    pub handshake_port: u16,
    /// Resource path the event subscription is created under.
    pub scope: &'a str,
    /// Name of the event subscription.
    pub event_subscription_name: &'a str,
    /// Authority host for token requests.
    pub active_directory_endpoint: &'a str,
    /// Base URL of the management API.
    pub resource_manager_endpoint: &'a str,
}

/// Outbound fields, all present, as borrowed from an [`EventGridConfig`].
#[derive(Debug, Clone, Copy)]
pub struct OutputSettings<'a> {
    /// Key sent in the `aeg-sas-key` header.
    pub access_key: &'a AccessKey,
    /// Topic URL events are posted to.
    pub topic_endpoint: &'a str,
}

impl EventGridConfig {
    /// Creates a new builder for the component with the given name.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> EventGridConfigBuilder {
        EventGridConfigBuilder::new(name)
    }

    /// Resolves a host [`Metadata`] into a configuration record.
    ///
    /// Unknown keys are ignored. Scalar values (strings, numbers, booleans)
    /// are accepted and converted to their string form.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Decode`] naming the first known key, in
    /// [`PROPERTY_KEYS`] order, that holds an array or object.
    pub fn from_metadata(metadata: &Metadata) -> Result<Self, ConfigError> {
        let mut builder = EventGridConfigBuilder::new(&metadata.name);

        for field in PROPERTY_KEYS {
            let Some(value) = metadata.properties.get(field) else {
                continue;
            };
            let value = scalar(value).map_err(|reason| ConfigError::Decode {
                field,
                component: metadata.name.clone(),
                reason,
            })?;
            if let Some(value) = value {
                builder = builder.property(field, value);
            }
        }

        Ok(builder.build())
    }

    /// Returns the component name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tenant id, if configured.
    #[must_use]
    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    /// Returns the subscription id, if configured.
    #[must_use]
    pub fn subscription_id(&self) -> Option<&str> {
        self.subscription_id.as_deref()
    }

    /// Returns the client id, if configured.
    #[must_use]
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// Returns the client secret, if configured.
    #[must_use]
    pub const fn client_secret(&self) -> Option<&ClientSecret> {
        self.client_secret.as_ref()
    }

    /// Returns the subscriber endpoint, if configured.
    #[must_use]
    pub fn subscriber_endpoint(&self) -> Option<&str> {
        self.subscriber_endpoint.as_deref()
    }

    /// Returns the handshake port as configured (defaults to `"8080"`).
    #[must_use]
    pub fn handshake_port(&self) -> &str {
        &self.handshake_port
    }

    /// Returns the subscription scope, if configured.
    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Returns the event subscription name (defaults to the component name).
    #[must_use]
    pub fn event_subscription_name(&self) -> &str {
        &self.event_subscription_name
    }

    /// Returns the topic access key, if configured.
    #[must_use]
    pub const fn access_key(&self) -> Option<&AccessKey> {
        self.access_key.as_ref()
    }

    /// Returns the topic endpoint, if configured.
    #[must_use]
    pub fn topic_endpoint(&self) -> Option<&str> {
        self.topic_endpoint.as_deref()
    }

    /// Returns the authority host for token requests.
    #[must_use]
    pub fn active_directory_endpoint(&self) -> &str {
        &self.active_directory_endpoint
    }

    /// Returns the management API base URL.
    #[must_use]
    pub fn resource_manager_endpoint(&self) -> &str {
        &self.resource_manager_endpoint
    }

    /// Validates the fields needed to subscribe and listen.
    ///
    /// Fields are checked one at a time in a fixed order; the first missing
    /// one is reported.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] naming the first absent field, or
    /// [`ConfigError::InvalidField`] if the handshake port is not a valid port.
    pub fn ensure_input(&self) -> Result<InputSettings<'_>, ConfigError> {
        let tenant_id = self.require("tenantId", self.tenant_id.as_deref())?;
        let subscription_id = self.require("subscriptionId", self.subscription_id.as_deref())?;
        let client_id = self.require("clientId", self.client_id.as_deref())?;
        let client_secret = self
            .client_secret
            .as_ref()
            .ok_or_else(|| self.missing("clientSecret"))?;
        let subscriber_endpoint =
            self.require("subscriberEndpoint", self.subscriber_endpoint.as_deref())?;
        let handshake_port = self.require("handshakePort", Some(self.handshake_port.as_str()))?;
        let scope = self.require("scope", self.scope.as_deref())?;

        let handshake_port =
            handshake_port
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidField {
                    field: "handshakePort",
                    component: self.name.clone(),
                    reason: format!("'{handshake_port}' is not a valid port: {e}"),
                })?;

        Ok(InputSettings {
            tenant_id,
            subscription_id,
            client_id,
            client_secret,
            subscriber_endpoint,
            handshake_port,
            scope,
            event_subscription_name: &self.event_subscription_name,
            active_directory_endpoint: &self.active_directory_endpoint,
            resource_manager_endpoint: &self.resource_manager_endpoint,
        })
    }

    /// Validates the fields needed to publish.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] naming `accessKey` or
    /// `topicEndpoint` together with the component name.
    pub fn ensure_output(&self) -> Result<OutputSettings<'_>, ConfigError> {
        let access_key = self
            .access_key
            .as_ref()
            .ok_or_else(|| self.missing("accessKey"))?;
        let topic_endpoint = self.require("topicEndpoint", self.topic_endpoint.as_deref())?;

        Ok(OutputSettings {
            access_key,
            topic_endpoint,
        })
    }

    fn require<'a>(
        &self,
        field: &'static str,
        value: Option<&'a str>,
    ) -> Result<&'a str, ConfigError> {
        match value {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(self.missing(field)),
        }
    }

    fn missing(&self, field: &'static str) -> ConfigError {
        ConfigError::MissingField {
            field,
            component: self.name.clone(),
        }
    }
}

/// Builder for constructing [`EventGridConfig`] instances.
///
/// # Defaults
///
/// - `handshake_port`: `"8080"`
/// - `event_subscription_name`: the component name
/// - `active_directory_endpoint`: `https://login.microsoftonline.com`
/// - `resource_manager_endpoint`: `https://management.azure.com`
///
/// Empty strings are treated the same as unset values.
///
/// # Example
///
/// ```rust
/// use eventgrid_binding::EventGridConfig;
///
/// let config = EventGridConfig::builder("orders")
///     .access_key("key")
///     .topic_endpoint("https://orders.eventgrid.azure.net/api/events")
///     .handshake_port("9000")
///     .build();
///
/// assert_eq!(config.handshake_port(), "9000");
/// ```
#[derive(Debug, Default)]
pub struct EventGridConfigBuilder {
    name: String,
    tenant_id: Option<String>,
    subscription_id: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    subscriber_endpoint: Option<String>,
    handshake_port: Option<String>,
    scope: Option<String>,
    event_subscription_name: Option<String>,
    access_key: Option<String>,
    topic_endpoint: Option<String>,
    active_directory_endpoint: Option<String>,
    resource_manager_endpoint: Option<String>,
}

impl EventGridConfigBuilder {
    /// Creates a new builder for the named component.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the tenant id.
    #[must_use]
    pub fn tenant_id(mut self, value: impl Into<String>) -> Self {
        self.tenant_id = Some(value.into());
        self
    }

    /// Sets the subscription id.
    #[must_use]
    pub fn subscription_id(mut self, value: impl Into<String>) -> Self {
        self.subscription_id = Some(value.into());
        self
    }

    /// Sets the client id.
    #[must_use]
    pub fn client_id(mut self, value: impl Into<String>) -> Self {
        self.client_id = Some(value.into());
        self
    }

    /// Sets the client secret.
    #[must_use]
    pub fn client_secret(mut self, value: impl Into<String>) -> Self {
        self.client_secret = Some(value.into());
        self
    }

    /// Sets the public URL Event Grid delivers to.
    #[must_use]
    pub fn subscriber_endpoint(mut self, value: impl Into<String>) -> Self {
        self.subscriber_endpoint = Some(value.into());
        self
    }

    /// Sets the port the listener binds.
    #[must_use]
    pub fn handshake_port(mut self, value: impl Into<String>) -> Self {
        self.handshake_port = Some(value.into());
        self
    }

    /// Sets the resource path to subscribe against.
    #[must_use]
    pub fn scope(mut self, value: impl Into<String>) -> Self {
        self.scope = Some(value.into());
        self
    }

    /// Sets the event subscription name.
    #[must_use]
    pub fn event_subscription_name(mut self, value: impl Into<String>) -> Self {
        self.event_subscription_name = Some(value.into());
        self
    }

    /// Sets the topic access key.
    #[must_use]
    pub fn access_key(mut self, value: impl Into<String>) -> Self {
        self.access_key = Some(value.into());
        self
    }

    /// Sets the topic endpoint.
    #[must_use]
    pub fn topic_endpoint(mut self, value: impl Into<String>) -> Self {
        self.topic_endpoint = Some(value.into());
        self
    }

    /// Overrides the authority host used for token requests.
    #[must_use]
    pub fn active_directory_endpoint(mut self, value: impl Into<String>) -> Self {
        self.active_directory_endpoint = Some(value.into());
        self
    }

    /// Overrides the management API base URL.
    #[must_use]
    pub fn resource_manager_endpoint(mut self, value: impl Into<String>) -> Self {
        self.resource_manager_endpoint = Some(value.into());
        self
    }

    fn property(self, key: &str, value: String) -> Self {
        match key {
            "tenantId" => self.tenant_id(value),
            "subscriptionId" => self.subscription_id(value),
            "clientId" => self.client_id(value),
            "clientSecret" => self.client_secret(value),
            "subscriberEndpoint" => self.subscriber_endpoint(value),
            "handshakePort" => self.handshake_port(value),
            "scope" => self.scope(value),
            "eventSubscriptionName" => self.event_subscription_name(value),
            "accessKey" => self.access_key(value),
            "topicEndpoint" => self.topic_endpoint(value),
            "activeDirectoryEndpoint" => self.active_directory_endpoint(value),
            "resourceManagerEndpoint" => self.resource_manager_endpoint(value),
            _ => self,
        }
    }

    /// Builds the [`EventGridConfig`], applying defaults.
    #[must_use]
    pub fn build(self) -> EventGridConfig {
        let event_subscription_name =
            non_empty(self.event_subscription_name).unwrap_or_else(|| self.name.clone());

        EventGridConfig {
            tenant_id: non_empty(self.tenant_id),
            subscription_id: non_empty(self.subscription_id),
            client_id: non_empty(self.client_id),
            client_secret: non_empty(self.client_secret).map(ClientSecret::new),
            subscriber_endpoint: non_empty(self.subscriber_endpoint),
            handshake_port: non_empty(self.handshake_port)
                .unwrap_or_else(|| DEFAULT_HANDSHAKE_PORT.to_string()),
            scope: non_empty(self.scope),
            event_subscription_name,
            access_key: non_empty(self.access_key).map(AccessKey::new),
            topic_endpoint: non_empty(self.topic_endpoint),
            active_directory_endpoint: non_empty(self.active_directory_endpoint)
                .unwrap_or_else(|| DEFAULT_ACTIVE_DIRECTORY_ENDPOINT.to_string()),
            resource_manager_endpoint: non_empty(self.resource_manager_endpoint)
                .unwrap_or_else(|| DEFAULT_RESOURCE_MANAGER_ENDPOINT.to_string()),
            name: self.name,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

const SCALAR: &str = "a string, number, or boolean";

/// Accepts strings, numbers, and booleans; rejects arrays and objects.
fn scalar(value: &Value) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Array(_) => Err(format!("expected {SCALAR}, found an array")),
        Value::Object(_) => Err(format!("expected {SCALAR}, found an object")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_input_metadata() -> Metadata {
        Metadata::new("orders")
            .with_property("tenantId", "tenant")
            .with_property("subscriptionId", "sub")
            .with_property("clientId", "client")
            .with_property("clientSecret", "secret")
            .with_property("subscriberEndpoint", "https://example.com/api/events")
            .with_property("scope", "/subscriptions/sub/resourceGroups/rg")
    }

    const INPUT_FIELDS: [&str; 6] = [
        "tenantId",
        "subscriptionId",
        "clientId",
        "clientSecret",
        "subscriberEndpoint",
        "scope",
    ];

    #[test]
    fn test_default_handshake_port_when_absent() {
        let config = EventGridConfig::from_metadata(&Metadata::new("orders")).unwrap();
        assert_eq!(config.handshake_port(), "8080");
    }

    #[test]
    fn test_empty_handshake_port_falls_back_to_default() {
        let metadata = Metadata::new("orders").with_property("handshakePort", "");
        let config = EventGridConfig::from_metadata(&metadata).unwrap();
        assert_eq!(config.handshake_port(), DEFAULT_HANDSHAKE_PORT);
    }

    #[test]
    fn test_event_subscription_name_defaults_to_component_name() {
        let config = EventGridConfig::from_metadata(&Metadata::new("orders")).unwrap();
        assert_eq!(config.event_subscription_name(), "orders");
    }

    #[test]
    fn test_explicit_event_subscription_name_is_kept() {
        let metadata = Metadata::new("orders").with_property("eventSubscriptionName", "orders-sub");
        let config = EventGridConfig::from_metadata(&metadata).unwrap();
        assert_eq!(config.event_subscription_name(), "orders-sub");
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let metadata = Metadata::new("orders")
            .with_property("somethingElse", "value")
            .with_property("nested", serde_json::json!({"a": 1}));
        assert!(EventGridConfig::from_metadata(&metadata).is_ok());
    }

    #[test]
    fn test_numeric_port_is_accepted() {
        let metadata = Metadata::new("orders").with_property("handshakePort", 9000);
        let config = EventGridConfig::from_metadata(&metadata).unwrap();
        assert_eq!(config.handshake_port(), "9000");
    }

    #[test]
    fn test_non_scalar_value_fails_with_decode_error() {
        let metadata =
            Metadata::new("orders").with_property("tenantId", serde_json::json!(["a", "b"]));
        let error = EventGridConfig::from_metadata(&metadata).unwrap_err();

        assert!(matches!(
            &error,
            ConfigError::Decode {
                field: "tenantId",
                component,
                ..
            } if component == "orders"
        ));
        let message = error.to_string();
        assert!(message.contains("'tenantId'"));
        assert!(message.contains("(orders)"));
    }

    #[test]
    fn test_first_undecodable_key_is_reported_in_key_order() {
        let metadata = Metadata::new("orders")
            .with_property("topicEndpoint", serde_json::json!({"url": "x"}))
            .with_property("scope", serde_json::json!(["a"]));
        let error = EventGridConfig::from_metadata(&metadata).unwrap_err();
        assert!(matches!(error, ConfigError::Decode { field: "scope", .. }));
    }

    #[test]
    fn test_boolean_and_null_values() {
        let metadata = Metadata::new("orders")
            .with_property("scope", true)
            .with_property("tenantId", Value::Null);
        let config = EventGridConfig::from_metadata(&metadata).unwrap();
        assert_eq!(config.scope(), Some("true"));
        assert_eq!(config.tenant_id(), None);
    }

    #[test]
    fn test_ensure_input_succeeds_with_all_fields() {
        let config = EventGridConfig::from_metadata(&full_input_metadata()).unwrap();
        let input = config.ensure_input().unwrap();
        assert_eq!(input.tenant_id, "tenant");
        assert_eq!(input.handshake_port, 8080);
        assert_eq!(input.event_subscription_name, "orders");
        assert_eq!(input.resource_manager_endpoint, DEFAULT_RESOURCE_MANAGER_ENDPOINT);
    }

    #[test]
    fn test_ensure_input_names_each_missing_field() {
        for field in INPUT_FIELDS {
            let mut metadata = full_input_metadata();
            metadata.properties.remove(field);
            let config = EventGridConfig::from_metadata(&metadata).unwrap();

            match config.ensure_input() {
                Err(ConfigError::MissingField { field: missing, .. }) => {
                    assert_eq!(missing, field);
                }
                other => panic!("expected MissingField for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_ensure_input_rejects_invalid_port() {
        let metadata = full_input_metadata().with_property("handshakePort", "http");
        let config = EventGridConfig::from_metadata(&metadata).unwrap();
        let error = config.ensure_input().unwrap_err();

        assert!(matches!(
            &error,
            ConfigError::InvalidField {
                field: "handshakePort",
                component,
                ..
            } if component == "orders"
        ));
        assert!(error.to_string().contains("(orders)"));
    }

    #[test]
    fn test_ensure_output_names_field_and_component() {
        let config = EventGridConfig::builder("orders-out")
            .topic_endpoint("https://topic")
            .build();
        let error = config.ensure_output().unwrap_err();
        assert_eq!(
            error,
            ConfigError::MissingField {
                field: "accessKey",
                component: "orders-out".to_string(),
            }
        );

        let config = EventGridConfig::builder("orders-out").access_key("key").build();
        let message = config.ensure_output().unwrap_err().to_string();
        assert!(message.contains("topicEndpoint"));
        assert!(message.contains("orders-out"));
    }

    #[test]
    fn test_output_only_config_does_not_need_input_fields() {
        let config = EventGridConfig::builder("orders")
            .access_key("key")
            .topic_endpoint("https://topic")
            .build();
        assert!(config.ensure_output().is_ok());
        assert!(config.ensure_input().is_err());
    }

    #[test]
    fn test_debug_output_masks_secrets() {
        let config = EventGridConfig::builder("orders")
            .client_secret("very-secret")
            .access_key("very-key")
            .build();
        let debug = format!("{config:?}");
        assert!(!debug.contains("very-secret"));
        assert!(!debug.contains("very-key"));
    }
}
