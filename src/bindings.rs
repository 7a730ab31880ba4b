//! Host binding framework surface.
//!
//! A binding is an input/output adapter: the input side subscribes to a remote
//! source and hands each delivered payload to a caller-supplied
//! [`EventHandler`]; the output side accepts a [`WriteRequest`] and sends it
//! to the remote destination.
//!
//! # Example
//!
//! ```rust
//! use eventgrid_binding::{HandlerError, Metadata, ReadResponse};
//!
//! let metadata = Metadata::new("orders").with_property("handshakePort", "9000");
//! assert_eq!(metadata.name, "orders");
//!
//! // Plain closures are handlers
//! let handler = |response: ReadResponse| -> Result<(), HandlerError> {
//!     println!("received {} bytes", response.data.len());
//!     Ok(())
//! };
//! # let _ = handler;
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use thiserror::Error;

use crate::error::BindingError;

/// Component definition supplied by the host at `init`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    /// Component name.
    pub name: String,
    /// Untyped configuration properties.
    pub properties: HashMap<String, Value>,
}

impl Metadata {
    /// Creates metadata for the named component with no properties.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: HashMap::new(),
        }
    }

    /// Adds a property, replacing any existing value for the key.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// An inbound delivery handed to an [`EventHandler`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReadResponse {
    /// The delivered payload, unmodified.
    pub data: Vec<u8>,
    /// Transport details of the delivery (e.g. `contentType`).
    pub metadata: HashMap<String, String>,
}

/// Operations an output binding can perform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Publish the payload.
    #[default]
    Create,
}

impl OperationKind {
    /// Returns the operation name as used by hosts.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outbound payload handed to an output binding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteRequest {
    /// The payload to send, unmodified.
    pub data: Vec<u8>,
    /// Request metadata from the host.
    pub metadata: HashMap<String, String>,
    /// The requested operation.
    pub operation: OperationKind,
}

impl WriteRequest {
    /// Creates a `create` request carrying `data`.
    #[must_use]
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            ..Self::default()
        }
    }
}

/// Error returned by an [`EventHandler`].
///
/// The message is sent back to the event source as the body of a 500
/// response.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct HandlerError {
    /// Description of the failure.
    pub message: String,
}

impl HandlerError {
    /// Creates a handler error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Receives inbound deliveries.
///
/// Invoked concurrently for overlapping deliveries, so implementations must
/// be safe to share across tasks.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handles one delivered payload.
    async fn handle(&self, response: ReadResponse) -> Result<(), HandlerError>;
}

#[async_trait]
impl<F> EventHandler for F
where
    F: Fn(ReadResponse) -> Result<(), HandlerError> + Send + Sync,
{
    async fn handle(&self, response: ReadResponse) -> Result<(), HandlerError> {
        self(response)
    }
}

/// Adapts an async closure into an [`EventHandler`].
///
/// # Example
///
/// ```rust
/// use eventgrid_binding::bindings::handler_fn;
/// use eventgrid_binding::ReadResponse;
///
/// let handler = handler_fn(|response: ReadResponse| async move {
///     tokio::task::yield_now().await;
///     let _ = response.data;
///     Ok::<(), eventgrid_binding::HandlerError>(())
/// });
/// # let _ = handler;
/// ```
pub const fn handler_fn<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(ReadResponse) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    HandlerFn(f)
}

/// Handler wrapping an async closure; see [`handler_fn`].
#[derive(Clone, Copy)]
pub struct HandlerFn<F>(F);

impl<F> fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HandlerFn")
    }
}

#[async_trait]
impl<F, Fut> EventHandler for HandlerFn<F>
where
    F: Fn(ReadResponse) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn handle(&self, response: ReadResponse) -> Result<(), HandlerError> {
        (self.0)(response).await
    }
}

/// The inbound side of a binding.
#[async_trait]
pub trait InputBinding: Send + Sync {
    /// Resolves configuration from the host's component definition.
    async fn init(&mut self, metadata: Metadata) -> Result<(), BindingError>;

    /// Starts receiving, handing each delivery to `handler` until closed.
    async fn read(&self, handler: std::sync::Arc<dyn EventHandler>) -> Result<(), BindingError>;
}

/// The outbound side of a binding.
#[async_trait]
pub trait OutputBinding: Send + Sync {
    /// Resolves configuration from the host's component definition.
    async fn init(&mut self, metadata: Metadata) -> Result<(), BindingError>;

    /// Sends one payload.
    async fn write(&self, request: WriteRequest) -> Result<(), BindingError>;

    /// Lists the operations `write` supports.
    fn operations(&self) -> Vec<OperationKind>;
}
