//! Error type for event subscription registration.

use thiserror::Error;

/// The management API answered something other than `201 Created`.
///
/// Displays exactly the response body so the service's own explanation
/// reaches the caller unchanged.
///
/// # Example
///
/// ```rust
/// use eventgrid_binding::subscription::SubscriptionError;
///
/// let error = SubscriptionError {
///     status: 400,
///     message: "bad scope".to_string(),
/// };
/// assert_eq!(error.to_string(), "bad scope");
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SubscriptionError {
    /// The HTTP status code returned.
    pub status: u16,
    /// The response body.
    pub message: String,
}
