//! OAuth 2.0 client credentials grant against the directory authority.

use super::{AuthError, TRACING_TARGET};
use crate::config::{ClientSecret, DEFAULT_ACTIVE_DIRECTORY_ENDPOINT};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Grant type for client credentials.
const CLIENT_CREDENTIALS_GRANT_TYPE: &str = "client_credentials";

/// Form body of the token request.
#[derive(Debug, Serialize)]
struct ClientCredentialsRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'a str,
    scope: &'a str,
}

/// Successful token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// A bearer token for the management API.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// The bearer token value.
    pub token: String,
    /// When the token stops being accepted, if the authority said so.
    pub expires_on: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Returns `true` once the expiry has passed.
    ///
    /// Tokens without an expiry are considered never expired.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.expires_within(Duration::zero())
    }

    /// Returns `true` if the token expires within `margin` from now.
    #[must_use]
    pub fn expires_within(&self, margin: Duration) -> bool {
        self.expires_on
            .is_some_and(|expires| Utc::now() + margin >= expires)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"*****")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// A service principal authenticating with a client secret.
///
/// # Thread Safety
///
/// `ClientSecretCredential` is `Send + Sync`.
#[derive(Clone, Debug)]
pub struct ClientSecretCredential {
    tenant_id: String,
    client_id: String,
    client_secret: ClientSecret,
    authority_host: String,
}

// Verify types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientSecretCredential>();
    assert_send_sync::<AccessToken>();
};

impl ClientSecretCredential {
    /// Creates a credential against the public cloud authority.
    #[must_use]
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: ClientSecret,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret,
            authority_host: DEFAULT_ACTIVE_DIRECTORY_ENDPOINT.to_string(),
        }
    }

    /// Overrides the authority host (sovereign clouds, test stubs).
    #[must_use]
    pub fn with_authority_host(mut self, authority_host: impl Into<String>) -> Self {
        self.authority_host = authority_host.into();
        self
    }

    /// Returns the token endpoint for this credential's tenant.
    #[must_use]
    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_host.trim_end_matches('/'),
            self.tenant_id
        )
    }

    /// Requests a token for `scope`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Network`] if the authority cannot be reached
    /// - [`AuthError::TokenRequestFailed`] for a non-success status
    /// - [`AuthError::InvalidTokenResponse`] if the body is not a token
    pub async fn get_token(
        &self,
        client: &reqwest::Client,
        scope: &str,
    ) -> Result<AccessToken, AuthError> {
        let token_url = self.token_url();

        let request_body = ClientCredentialsRequest {
            client_id: &self.client_id,
            client_secret: self.client_secret.as_ref(),
            grant_type: CLIENT_CREDENTIALS_GRANT_TYPE,
            scope,
        };

        tracing::debug!(
            target: TRACING_TARGET,
            tenant_id = %self.tenant_id,
            client_id = %self.client_id,
            scope,
            "Requesting management API token"
        );

        let response = client.post(&token_url).form(&request_body).send().await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let message = response.text().await?;
            tracing::error!(
                target: TRACING_TARGET,
                status,
                "Token request rejected"
            );
            return Err(AuthError::TokenRequestFailed { status, message });
        }

        let body = response.text().await?;
        let token_response: TokenResponse =
            serde_json::from_str(&body).map_err(|e| AuthError::InvalidTokenResponse {
                reason: e.to_string(),
            })?;

        let expires_on = token_response
            .expires_in
            .map(|seconds| Utc::now() + Duration::seconds(seconds));

        Ok(AccessToken {
            token: token_response.access_token,
            expires_on,
        })
    }
}
