//! # Azure Event Grid Binding
//!
//! An input/output binding for Azure Event Grid: receive events through a
//! webhook subscription, and publish events to a topic.
//!
//! ## Overview
//!
//! This crate provides:
//! - Property-bag configuration resolved into a typed [`EventGridConfig`]
//! - Event subscription registration via the management API, authenticated
//!   with a service principal's client credentials
//! - A webhook listener answering the validation handshake and forwarding
//!   deliveries to an [`EventHandler`]
//! - A topic publisher posting cloud events with the topic access key
//!
//! ## Receiving Events
//!
//! ```rust,ignore
//! use eventgrid_binding::{AzureEventGrid, HandlerError, Metadata, ReadResponse};
//!
//! let mut binding = AzureEventGrid::new();
//! binding.init(
//!     Metadata::new("orders")
//!         .with_property("tenantId", "<tenant>")
//!         .with_property("subscriptionId", "<subscription>")
//!         .with_property("clientId", "<client>")
//!         .with_property("clientSecret", "<secret>")
//!         .with_property("subscriberEndpoint", "https://myapp.example.com/api/events")
//!         .with_property("scope", "/subscriptions/<subscription>/resourceGroups/<rg>/providers/Microsoft.EventGrid/topics/orders"),
//! )?;
//!
//! // Serves until binding.close() is called
//! binding
//!     .read(|response: ReadResponse| -> Result<(), HandlerError> {
//!         println!("{}", String::from_utf8_lossy(&response.data));
//!         Ok(())
//!     })
//!     .await?;
//! ```
//!
//! ## Publishing Events
//!
//! ```rust,ignore
//! use eventgrid_binding::{AzureEventGrid, Metadata, WriteRequest};
//!
//! let mut binding = AzureEventGrid::new();
//! binding.init(
//!     Metadata::new("orders")
//!         .with_property("accessKey", "<topic key>")
//!         .with_property("topicEndpoint", "https://orders.westus2-1.eventgrid.azure.net/api/events"),
//! )?;
//!
//! binding.write(WriteRequest::new(r#"{"specversion":"1.0","id":"1"}"#)).await?;
//! ```
//!
//! ## Design Principles
//!
//! - **Lazy validation**: Each direction checks only its own required fields
//! - **Fail-fast**: One attempt per remote call; errors return to the caller
//! - **Opaque payloads**: Event bodies pass through unparsed in both directions
//! - **Thread-safe**: All types are `Send + Sync`

pub mod auth;
pub mod binding;
pub mod bindings;
pub mod config;
pub mod error;
pub mod listener;
pub mod publisher;
pub mod subscription;

// Re-export public types at crate root for convenience
pub use binding::AzureEventGrid;
pub use bindings::{
    EventHandler, HandlerError, InputBinding, Metadata, OperationKind, OutputBinding,
    ReadResponse, WriteRequest,
};
pub use config::{AccessKey, ClientSecret, EventGridConfig, EventGridConfigBuilder};
pub use error::{BindingError, ConfigError};
