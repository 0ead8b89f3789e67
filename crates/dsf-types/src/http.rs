//! Custom HTTP endpoints registered with the control server.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Namespace that registers root-level `rr_` requests, emulating the
/// firmware's own poll endpoints.
pub const RRF_NAMESPACE: &str = "rr_";

/// HTTP method an endpoint answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum HttpEndpointType {
    /// `GET`
    #[serde(rename = "GET")]
    #[strum(serialize = "GET")]
    Get,
    /// `POST`
    #[serde(rename = "POST")]
    #[strum(serialize = "POST")]
    Post,
    /// `PUT`
    #[serde(rename = "PUT")]
    #[strum(serialize = "PUT")]
    Put,
    /// `PATCH`
    #[serde(rename = "PATCH")]
    #[strum(serialize = "PATCH")]
    Patch,
    /// `TRACE`
    #[serde(rename = "TRACE")]
    #[strum(serialize = "TRACE")]
    Trace,
    /// `DELETE`
    #[serde(rename = "DELETE")]
    #[strum(serialize = "DELETE")]
    Delete,
    /// `OPTIONS`
    #[serde(rename = "OPTIONS")]
    #[strum(serialize = "OPTIONS")]
    Options,
    /// A WebSocket upgrade; the connection stays open across responses.
    WebSocket,
}

/// How the web server should interpret a response body.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HttpResponseType {
    /// Status code only; the body is ignored.
    #[default]
    StatusCode,
    /// UTF-8 text.
    PlainText,
    /// JSON document.
    Json,
    /// Absolute path of a file whose contents are returned.
    File,
    /// Redirect target.
    Uri,
}

/// An extra HTTP endpoint served through a Unix socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpEndpoint {
    /// HTTP method.
    pub endpoint_type: HttpEndpointType,
    /// Namespace, usually the plugin identifier, or [`RRF_NAMESPACE`].
    pub namespace: String,
    /// Path below the namespace.
    pub path: String,
    /// Whether request bodies are spooled to a temporary file whose path
    /// is passed as the body.
    #[serde(default)]
    pub is_upload_request: bool,
    /// Socket the control server forwards requests to.
    pub unix_socket: String,
}

impl HttpEndpoint {
    /// Returns the URL path the web server exposes, such as
    /// `/machine/my-plugin/status` or `/rr_status`.
    #[must_use]
    pub fn uri(&self) -> String {
        if self.namespace == RRF_NAMESPACE {
            format!("/{RRF_NAMESPACE}{}", self.path)
        } else {
            format!("/machine/{}/{}", self.namespace, self.path)
        }
    }
}
