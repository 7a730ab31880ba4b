//! Error type for topic publishing.

use thiserror::Error;

/// The topic endpoint answered something other than `200 OK`.
///
/// Displays exactly the response body.
///
/// # Example
///
/// ```rust
/// use eventgrid_binding::publisher::PublishError;
///
/// let error = PublishError {
///     status: 403,
///     message: "denied".to_string(),
/// };
/// assert_eq!(error.to_string(), "denied");
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct PublishError {
    /// The HTTP status code returned.
    pub status: u16,
    /// The response body.
    pub message: String,
}
