//! Wire types of the event subscription resource.
//!
//! Only the parts this binding sets are modelled: the webhook destination and
//! the delivery schema.
//!
//! # Example
//!
//! ```rust
//! use eventgrid_binding::subscription::EventSubscription;
//!
//! let subscription = EventSubscription::webhook("https://myapp.example.com/api/events");
//! let json = serde_json::to_value(&subscription).unwrap();
//!
//! assert_eq!(json["properties"]["destination"]["endpointType"], "WebHook");
//! assert_eq!(json["properties"]["eventDeliverySchema"], "CloudEventSchemaV1_0");
//! ```

use serde::Serialize;

/// An event subscription resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EventSubscription {
    /// Resource properties.
    pub properties: EventSubscriptionProperties,
}

impl EventSubscription {
    /// A subscription delivering cloud events to a webhook at `endpoint_url`.
    #[must_use]
    pub fn webhook(endpoint_url: impl Into<String>) -> Self {
        Self {
            properties: EventSubscriptionProperties {
                destination: EventSubscriptionDestination::WebHook(WebHookDestinationProperties {
                    endpoint_url: endpoint_url.into(),
                }),
                event_delivery_schema: EventDeliverySchema::CloudEventSchemaV10,
            },
        }
    }
}

/// Properties of an [`EventSubscription`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSubscriptionProperties {
    /// Where events are delivered.
    pub destination: EventSubscriptionDestination,
    /// Envelope format of delivered events.
    pub event_delivery_schema: EventDeliverySchema,
}

/// Delivery destination, tagged by `endpointType`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "endpointType", content = "properties")]
pub enum EventSubscriptionDestination {
    /// An HTTP webhook.
    WebHook(WebHookDestinationProperties),
}

/// Properties of a webhook destination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebHookDestinationProperties {
    /// URL events are posted to.
    pub endpoint_url: String,
}

/// Envelope format events are delivered in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum EventDeliverySchema {
    /// CloudEvents 1.0.
    #[default]
    #[serde(rename = "CloudEventSchemaV1_0")]
    CloudEventSchemaV10,
}
