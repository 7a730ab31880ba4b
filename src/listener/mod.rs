//! Inbound webhook listener.
//!
//! A single HTTP route, [`EVENTS_PATH`], answers two request shapes:
//!
//! | method | behavior |
//! |--------|----------|
//! | `OPTIONS` | Webhook validation handshake: echoes `WebHook-Request-Origin` into `WebHook-Allowed-Origin`, sets `WebHook-Allowed-Rate: *`, status 200, empty body |
//! | `POST` | Event delivery: the body is handed to the [`EventHandler`] unmodified; a handler error is answered with 500 and the error text |
//!
//! Unknown paths are answered with 404 and other methods on [`EVENTS_PATH`]
//! with 405.
//!
//! Each request is handled on its own task, so the handler may run
//! concurrently for overlapping deliveries. The listener serves until its
//! [`CancellationToken`] is cancelled.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use eventgrid_binding::listener;
//! use eventgrid_binding::{HandlerError, ReadResponse};
//! use tokio_util::sync::CancellationToken;
//!
//! let handler = Arc::new(|response: ReadResponse| -> Result<(), HandlerError> {
//!     println!("{}", String::from_utf8_lossy(&response.data));
//!     Ok(())
//! });
//!
//! let shutdown = CancellationToken::new();
//! let tcp = listener::bind(8080).await?;
//! listener::serve(tcp, handler, shutdown.clone()).await?;
//! ```

mod errors;

pub use errors::ListenerError;

use crate::bindings::{EventHandler, ReadResponse};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::options;
use axum::Router;
use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// The path events are delivered to.
pub const EVENTS_PATH: &str = "/api/events";

/// Handshake request header carrying the origin to acknowledge.
pub const WEBHOOK_REQUEST_ORIGIN: &str = "webhook-request-origin";

/// Handshake response header acknowledging the origin.
pub const WEBHOOK_ALLOWED_ORIGIN: &str = "webhook-allowed-origin";

/// Handshake response header granting the delivery rate.
pub const WEBHOOK_ALLOWED_RATE: &str = "webhook-allowed-rate";

/// Metadata key under which a delivery's content type is passed to handlers.
pub const CONTENT_TYPE_METADATA_KEY: &str = "contentType";

const TRACING_TARGET: &str = "eventgrid_binding::listener";

/// Builds the router serving [`EVENTS_PATH`].
pub fn router(handler: Arc<dyn EventHandler>) -> Router {
    Router::new()
        .route(EVENTS_PATH, options(handshake).post(deliver))
        .with_state(handler)
}

/// Binds the listen socket on all interfaces at `port`.
///
/// # Errors
///
/// Returns [`ListenerError::Bind`] if the address cannot be bound.
pub async fn bind(port: u16) -> Result<TcpListener, ListenerError> {
    let address = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));

    TcpListener::bind(address).await.map_err(|source| {
        tracing::error!(
            target: TRACING_TARGET,
            addr = %address,
            error = %source,
            "Failed to bind to address"
        );
        ListenerError::Bind {
            address: address.to_string(),
            source,
        }
    })
}

/// Serves deliveries on `listener` until `shutdown` is cancelled.
///
/// In-flight requests are allowed to finish after cancellation.
///
/// # Errors
///
/// Returns [`ListenerError::Serve`] if the server loop fails.
pub async fn serve(
    listener: TcpListener,
    handler: Arc<dyn EventHandler>,
    shutdown: CancellationToken,
) -> Result<(), ListenerError> {
    let address = listener.local_addr().map_err(ListenerError::Serve)?;

    tracing::info!(
        target: TRACING_TARGET,
        addr = %address,
        path = EVENTS_PATH,
        "Listening for events"
    );

    axum::serve(listener, router(handler))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %err,
                "Listener encountered an error"
            );
            ListenerError::Serve(err)
        })?;

    tracing::info!(target: TRACING_TARGET, "Listener shut down gracefully");
    Ok(())
}

async fn handshake(headers: HeaderMap) -> impl IntoResponse {
    let origin = headers
        .get(WEBHOOK_REQUEST_ORIGIN)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(""));

    tracing::debug!(
        target: TRACING_TARGET,
        origin = ?origin,
        "Answering webhook validation handshake"
    );

    (
        StatusCode::OK,
        [
            (WEBHOOK_ALLOWED_ORIGIN, origin),
            (WEBHOOK_ALLOWED_RATE, HeaderValue::from_static("*")),
        ],
    )
}

async fn deliver(
    State(handler): State<Arc<dyn EventHandler>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut metadata = HashMap::new();
    if let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
        metadata.insert(
            CONTENT_TYPE_METADATA_KEY.to_string(),
            content_type.to_string(),
        );
    }

    tracing::debug!(
        target: TRACING_TARGET,
        bytes = body.len(),
        "Received event delivery"
    );

    let response = ReadResponse {
        data: body.to_vec(),
        metadata,
    };

    match handler.handle(response).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => {
            tracing::error!(
                target: TRACING_TARGET,
                error = %err,
                "Event handler failed"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, err.message).into_response()
        }
    }
}
