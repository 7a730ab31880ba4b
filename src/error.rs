//! Error types for the Event Grid binding.
//!
//! [`ConfigError`] covers configuration decoding and validation. [`BindingError`]
//! is the unified error returned by the binding entry points (`init`, `read`,
//! `write`), wrapping the error types of each component.
//!
//! # Error Handling
//!
//! Every wrapped error is transparent, so the text a caller sees is the text of
//! the underlying failure. For remote rejections (subscription or publish) that
//! text is the response body returned by the service.
//!
//! # Example
//!
//! ```rust
//! use eventgrid_binding::ConfigError;
//!
//! let error = ConfigError::MissingField {
//!     field: "tenantId",
//!     component: "orders".to_string(),
//! };
//! assert!(error.to_string().contains("'tenantId'"));
//! ```

use crate::auth::AuthError;
use crate::listener::ListenerError;
use crate::publisher::PublishError;
use crate::subscription::SubscriptionError;
use thiserror::Error;

/// Errors that can occur while resolving or validating binding configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A field required for the requested direction is empty or absent.
    #[error("metadata field '{field}' is empty in EventGrid binding ({component})")]
    MissingField {
        /// The property key of the missing field.
        field: &'static str,
        /// The component name the binding was initialized with.
        component: String,
    },

    /// A field is present but its value is unusable.
    #[error("metadata field '{field}' is invalid in EventGrid binding ({component}): {reason}")]
    InvalidField {
        /// The property key of the invalid field.
        field: &'static str,
        /// The component name the binding was initialized with.
        component: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A known property holds a value that is not a string, number, or boolean.
    #[error("metadata field '{field}' cannot be decoded in EventGrid binding ({component}): {reason}")]
    Decode {
        /// The property key of the undecodable field.
        field: &'static str,
        /// The component name the binding was initialized with.
        component: String,
        /// What was found instead of a scalar.
        reason: String,
    },

    /// `read` or `write` was called before `init`.
    #[error("EventGrid binding has not been initialized")]
    NotInitialized,
}

/// Unified error returned by the binding's `init`, `read`, and `write`.
#[derive(Debug, Error)]
pub enum BindingError {
    /// Missing or malformed configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Token acquisition for the management API failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The management API did not create the event subscription.
    #[error(transparent)]
    Subscription(#[from] SubscriptionError),

    /// The topic endpoint rejected a published event.
    #[error(transparent)]
    Publish(#[from] PublishError),

    /// Network-level failure talking to a remote endpoint.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The inbound listener could not bind or stopped with an error.
    #[error(transparent)]
    Listener(#[from] ListenerError),
}

// Verify error types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ConfigError>();
    assert_send_sync::<BindingError>();
};
