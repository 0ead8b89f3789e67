//! Serving third-party HTTP endpoints.
//!
//! After an endpoint is registered with
//! [`CommandSession::add_http_endpoint`](crate::connection::CommandSession::add_http_endpoint),
//! the web server forwards each request to a Unix socket owned by the
//! client. [`HttpEndpointSocket`] listens on that socket and hands every
//! accepted connection to an [`HttpEndpointHandler`] on its own thread, so
//! one slow handler never delays the others.

mod connection;
mod errors;
mod listener;

use std::collections::BTreeMap;

use dsf_types::{HttpEndpoint, HttpResponseType};
use serde::{Deserialize, Serialize};

pub use self::connection::HttpEndpointConnection;
pub use self::errors::BridgeError;
pub use self::listener::{BridgeCloser, BridgeHandle, HttpEndpointSocket};

const BRIDGE_TARGET: &str = "dsf_client::bridge";

/// Handles requests arriving on an endpoint socket.
pub trait HttpEndpointHandler: Send + Sync + 'static {
    /// Serves one accepted connection. Implementations should answer with
    /// [`HttpEndpointConnection::send_response`] and avoid panicking.
    fn handle(&self, endpoint: &HttpEndpoint, connection: HttpEndpointConnection);
}

impl<F> HttpEndpointHandler for F
where
    F: Fn(&HttpEndpoint, HttpEndpointConnection) + Send + Sync + 'static,
{
    fn handle(&self, endpoint: &HttpEndpoint, connection: HttpEndpointConnection) {
        self(endpoint, connection);
    }
}

/// An HTTP request forwarded by the web server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedHttpRequest {
    /// User session of the requester.
    #[serde(default)]
    pub session_id: i64,
    /// Query parameters.
    #[serde(default)]
    pub queries: BTreeMap<String, String>,
    /// Request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Content type of the body.
    #[serde(default)]
    pub content_type: Option<String>,
    /// Body text, or the path of the spooled file for upload endpoints.
    #[serde(default)]
    pub body: String,
}

/// Answer to a [`ReceivedHttpRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendHttpResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// Body, or a file path or URI depending on `response_type`.
    pub response: String,
    /// How `response` is interpreted.
    pub response_type: HttpResponseType,
}
