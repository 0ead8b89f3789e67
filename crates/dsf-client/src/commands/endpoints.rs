//! HTTP endpoint and user session registration.

use dsf_types::{AccessLevel, HttpEndpointType, SessionType};
use serde::Serialize;

use super::command;

/// Registers a third-party HTTP endpoint. The reply is the path of the Unix
/// socket the client must listen on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddHttpEndpoint {
    /// HTTP method or WebSocket.
    pub endpoint_type: HttpEndpointType,
    /// Namespace under `/machine/`.
    pub namespace: String,
    /// Path below the namespace.
    pub path: String,
    /// Whether request bodies are streamed to a file.
    pub is_upload_request: bool,
}

command!(AddHttpEndpoint => String);

/// Unregisters an HTTP endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveHttpEndpoint {
    /// HTTP method or WebSocket.
    pub endpoint_type: HttpEndpointType,
    /// Namespace under `/machine/`.
    pub namespace: String,
    /// Path below the namespace.
    pub path: String,
}

command!(RemoveHttpEndpoint => Option<bool>);

/// Registers a user session. The reply is the new session id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUserSession {
    /// Granted access.
    pub access_level: AccessLevel,
    /// Session kind.
    pub session_type: SessionType,
    /// Origin, such as a remote address.
    pub origin: String,
    /// Origin port or process id.
    pub origin_id: i64,
}

impl AddUserSession {
    /// Builds the request. An `origin_id` of `-1` is replaced by the id of
    /// the current process.
    #[must_use]
    pub fn new(
        access_level: AccessLevel,
        session_type: SessionType,
        origin: impl Into<String>,
        origin_id: i64,
    ) -> Self {
        Self {
            access_level,
            session_type,
            origin: origin.into(),
            origin_id: if origin_id == -1 {
                i64::from(std::process::id())
            } else {
                origin_id
            },
        }
    }
}

command!(AddUserSession => i64);

/// Removes a user session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemoveUserSession {
    /// Session id returned by [`AddUserSession`].
    pub id: i64,
}

command!(RemoveUserSession => Option<bool>);
