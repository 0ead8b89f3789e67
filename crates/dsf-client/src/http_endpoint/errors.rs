//! Errors raised while binding or running an endpoint socket.

use std::io;

use thiserror::Error;

/// Errors surfaced by [`HttpEndpointSocket`](super::HttpEndpointSocket).
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Binding the listener failed.
    #[error("failed to bind endpoint socket at {path}: {source}")]
    Bind {
        /// Socket path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// A live server already listens on the path.
    #[error("endpoint socket {path} is already in use")]
    InUse {
        /// Socket path.
        path: String,
    },
    /// The path exists but is not a socket.
    #[error("endpoint socket path {path} is not a socket")]
    NotSocket {
        /// Socket path.
        path: String,
    },
    /// The existing path could not be inspected.
    #[error("failed to read metadata for endpoint socket {path}: {source}")]
    Metadata {
        /// Socket path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Probing the existing socket failed unexpectedly.
    #[error("failed to probe existing endpoint socket {path}: {source}")]
    Probe {
        /// Socket path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// A stale socket file could not be removed.
    #[error("failed to remove stale endpoint socket {path}: {source}")]
    Cleanup {
        /// Socket path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The listener could not be switched to non-blocking mode.
    #[error("failed to enable non-blocking accept: {source}")]
    NonBlocking {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The accept thread could not be started.
    #[error("failed to start the accept thread: {source}")]
    Spawn {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The accept thread panicked.
    #[error("endpoint accept thread panicked")]
    ThreadPanic,
}
