//! Error type for client-credentials token requests.

use thiserror::Error;

/// Errors that can occur while acquiring a management API token.
///
/// # Example
///
/// ```rust
/// use eventgrid_binding::auth::AuthError;
///
/// let error = AuthError::TokenRequestFailed {
///     status: 401,
///     message: "invalid_client".to_string(),
/// };
/// assert!(error.to_string().contains("401"));
/// ```
#[derive(Debug, Error)]
pub enum AuthError {
    /// The authority rejected the token request.
    #[error("Token request failed with status {status}: {message}")]
    TokenRequestFailed {
        /// The HTTP status code returned.
        status: u16,
        /// The response body.
        message: String,
    },

    /// The authority answered with success but the body is not a token.
    #[error("Invalid token response: {reason}")]
    InvalidTokenResponse {
        /// What could not be parsed.
        reason: String,
    },

    /// The token endpoint could not be reached.
    #[error(transparent)]
    Network(#[from] reqwest::Error),
}

// Verify AuthError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthError>();
};
