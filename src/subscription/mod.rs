//! Event subscription registration with the management API.
//!
//! Before the listener starts serving, the binding makes sure an event
//! subscription exists at the remote service that delivers to this binding's
//! public endpoint. The management API's create-or-update call is idempotent,
//! so the same request is sent on every start.
//!
//! # Overview
//!
//! - [`SubscriptionRegistrar`]: Authenticates and sends the create-or-update request
//! - [`EventSubscription`]: The subscription resource as sent on the wire
//! - [`EventDeliverySchema`]: The envelope format events are delivered in
//! - [`SubscriptionError`]: The management API did not answer `201 Created`
//!
//! # Example
//!
//! ```rust,ignore
//! use eventgrid_binding::subscription::{EventSubscription, SubscriptionRegistrar};
//!
//! let registrar = SubscriptionRegistrar::new(client, "https://management.azure.com", credential);
//! registrar
//!     .create_or_update(
//!         "/subscriptions/<id>/resourceGroups/<rg>/providers/Microsoft.EventGrid/topics/<topic>",
//!         "orders",
//!         &EventSubscription::webhook("https://myapp.example.com/api/events"),
//!     )
//!     .await?;
//! ```

mod errors;
mod registrar;
mod types;

pub use errors::SubscriptionError;
pub use registrar::{SubscriptionRegistrar, API_VERSION};
pub use types::{
    EventDeliverySchema, EventSubscription, EventSubscriptionDestination,
    EventSubscriptionProperties, WebHookDestinationProperties,
};

pub(crate) const TRACING_TARGET: &str = "eventgrid_binding::subscription";
