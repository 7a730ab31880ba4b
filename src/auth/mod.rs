//! Client-credentials authorization for the management API.
//!
//! The subscription registrar calls the resource management API on behalf of a
//! service principal. This module exchanges the principal's tenant id, client
//! id, and client secret for a bearer token using the OAuth 2.0 client
//! credentials grant.
//!
//! # Overview
//!
//! - [`ClientSecretCredential`]: The service principal and the authority it authenticates against
//! - [`AccessToken`]: A bearer token with its expiry
//! - [`AuthError`]: Failure modes of the token request
//!
//! # Example
//!
//! ```rust,ignore
//! use eventgrid_binding::auth::ClientSecretCredential;
//! use eventgrid_binding::ClientSecret;
//!
//! let credential = ClientSecretCredential::new(
//!     "tenant-id",
//!     "client-id",
//!     ClientSecret::new("client-secret"),
//! );
//!
//! let client = reqwest::Client::new();
//! let token = credential
//!     .get_token(&client, "https://management.azure.com/.default")
//!     .await?;
//! assert!(!token.expired());
//! ```

mod credential;
mod error;

pub use credential::{AccessToken, ClientSecretCredential};
pub use error::AuthError;

pub(crate) const TRACING_TARGET: &str = "eventgrid_binding::auth";
