//! Create-or-update of event subscriptions.

use super::{EventSubscription, SubscriptionError, TRACING_TARGET};
use crate::auth::{AccessToken, AuthError, ClientSecretCredential};
use crate::config::InputSettings;
use crate::error::BindingError;
use chrono::Duration;
use reqwest::StatusCode;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Management API version used for event subscriptions.
pub const API_VERSION: &str = "2020-04-01-preview";

/// A cached token this close to expiry is replaced before use.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 300;

/// Registers event subscriptions through the resource management API.
///
/// One attempt per call: no retry and no backoff. Any status other than
/// `201 Created` is a [`SubscriptionError`].
///
/// The management token is cached and shared by clones; a new one is
/// requested only when the cached token is about to expire.
///
/// # Thread Safety
///
/// `SubscriptionRegistrar` is `Send + Sync`.
#[derive(Clone, Debug)]
pub struct SubscriptionRegistrar {
    client: reqwest::Client,
    management_endpoint: String,
    credential: ClientSecretCredential,
    token: Arc<Mutex<Option<AccessToken>>>,
}

// Verify SubscriptionRegistrar is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SubscriptionRegistrar>();
};

impl SubscriptionRegistrar {
    /// Creates a registrar for the management API at `management_endpoint`.
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        management_endpoint: impl Into<String>,
        credential: ClientSecretCredential,
    ) -> Self {
        Self {
            client,
            management_endpoint: management_endpoint.into(),
            credential,
            token: Arc::default(),
        }
    }

    /// Creates a registrar from validated inbound settings.
    #[must_use]
    pub fn from_settings(client: reqwest::Client, settings: &InputSettings<'_>) -> Self {
        let credential = ClientSecretCredential::new(
            settings.tenant_id,
            settings.client_id,
            settings.client_secret.clone(),
        )
        .with_authority_host(settings.active_directory_endpoint);

        Self::new(client, settings.resource_manager_endpoint, credential)
    }

    /// Returns the token scope covering the management API.
    #[must_use]
    pub fn token_scope(&self) -> String {
        format!("{}/.default", self.management_endpoint.trim_end_matches('/'))
    }

    /// Returns the resource URL of the named subscription under `scope`.
    #[must_use]
    pub fn subscription_url(&self, scope: &str, name: &str) -> String {
        format!(
            "{}/{}/providers/Microsoft.EventGrid/eventSubscriptions/{}?api-version={API_VERSION}",
            self.management_endpoint.trim_end_matches('/'),
            scope.trim_matches('/'),
            urlencoding::encode(name),
        )
    }

    /// Creates the subscription, or updates it if it already exists.
    ///
    /// # Errors
    ///
    /// - [`BindingError::Auth`] if no management token could be obtained
    /// - [`BindingError::Transport`] if the management API cannot be reached
    /// - [`BindingError::Subscription`] if the API does not answer `201 Created`
    pub async fn create_or_update(
        &self,
        scope: &str,
        name: &str,
        subscription: &EventSubscription,
    ) -> Result<(), BindingError> {
        let token = self.bearer_token().await?;

        let url = self.subscription_url(scope, name);

        tracing::debug!(
            target: TRACING_TARGET,
            scope,
            subscription = name,
            destination = ?subscription.properties.destination,
            "Attempting to create or update event subscription"
        );

        let response = self
            .client
            .put(&url)
            .bearer_auth(&token)
            .json(subscription)
            .send()
            .await
            .map_err(|err| {
                tracing::error!(
                    target: TRACING_TARGET,
                    scope,
                    subscription = name,
                    error = %err,
                    "Failed to reach the management API"
                );
                err
            })?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let message = response.text().await?;
            tracing::error!(
                target: TRACING_TARGET,
                status = status.as_u16(),
                body = %message,
                "Event subscription was not created"
            );
            return Err(SubscriptionError {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        tracing::info!(
            target: TRACING_TARGET,
            scope,
            subscription = name,
            "Event subscription created"
        );

        Ok(())
    }

    /// Returns the cached token, requesting a new one if needed.
    async fn bearer_token(&self) -> Result<String, AuthError> {
        if let Some(token) = self.cached_token() {
            return Ok(token);
        }

        let token = self
            .credential
            .get_token(&self.client, &self.token_scope())
            .await?;
        let bearer = token.token.clone();
        *self.lock_token() = Some(token);
        Ok(bearer)
    }

    fn cached_token(&self) -> Option<String> {
        let margin = Duration::seconds(TOKEN_REFRESH_MARGIN_SECS);
        self.lock_token()
            .as_ref()
            .filter(|token| !token.expires_within(margin))
            .map(|token| token.token.clone())
    }

    fn lock_token(&self) -> MutexGuard<'_, Option<AccessToken>> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
