//! Error type for the inbound listener.

use std::io;
use thiserror::Error;

/// The listener could not start, or stopped with an error.
///
/// Errors raised while handling an individual delivery are not listener
/// errors: they are answered with a 500 and the listener keeps serving.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Binding the listen address failed.
    #[error("Failed to bind listener to {address}: {source}")]
    Bind {
        /// The address that could not be bound.
        address: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The server loop failed.
    #[error("Listener failed: {0}")]
    Serve(#[source] io::Error),
}
