//! Error types for control server connections.

use std::io;

use serde_json::Value;
use thiserror::Error;

use crate::commands::Response;
use crate::http_endpoint::BridgeError;
use crate::init::ConnectionMode;

/// Error type reported by the server when a command was cancelled, usually
/// because the machine was reset or the code was aborted.
pub const TASK_CANCELED_EXCEPTION: &str = "TaskCanceledException";

/// Error type reported by the server when the client protocol version is
/// not supported.
pub const INCOMPATIBLE_VERSION_EXCEPTION: &str = "IncompatibleVersionException";

/// Errors surfaced by connections to the control server.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The socket could not be opened.
    #[error("failed to connect to the control server at {path}: {source}")]
    Connect {
        /// Socket path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Writing to the socket failed.
    #[error("failed to send to the control server: {source}")]
    Send {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Reading from the socket failed.
    #[error("failed to read from the control server: {source}")]
    Receive {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The server closed the stream while a reply was outstanding.
    #[error("the control server closed the connection")]
    Closed,
    /// A value could not be serialised for sending.
    #[error("failed to serialise {target}: {source}")]
    Encode {
        /// Type that failed to serialise.
        target: &'static str,
        /// Underlying serialisation error.
        #[source]
        source: serde_json::Error,
    },
    /// A received payload did not match the expected type. The stream
    /// position is unreliable afterwards.
    #[error("failed to decode {target}: {source}")]
    Decode {
        /// Type the payload was decoded into.
        target: &'static str,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
    /// The server greeting advertised an older protocol version.
    #[error("incompatible API version (expected {required}, got {server})")]
    IncompatibleVersion {
        /// Version this client requires.
        required: i64,
        /// Version advertised by the server.
        server: i64,
    },
    /// The server refused the requested connection mode.
    #[error("could not set connection type {mode} ({error_type}: {error_message})")]
    ModeRejected {
        /// Requested mode.
        mode: ConnectionMode,
        /// Server error type.
        error_type: String,
        /// Server error message.
        error_message: String,
    },
    /// The server answered a command with `success: false`.
    #[error(transparent)]
    Command(Box<CommandError>),
    /// An intercepted code is still waiting for its Cancel, Ignore or
    /// Resolve reply.
    #[error("intercepted code '{code}' must be cancelled, ignored or resolved first")]
    ResolutionPending {
        /// Text of the pending code.
        code: String,
    },
    /// The socket of a newly registered HTTP endpoint could not be bound.
    #[error("failed to bind HTTP endpoint socket: {0}")]
    Endpoint(#[source] BridgeError),
    /// Cancel, Ignore or Resolve was sent without an intercepted code.
    #[error("no intercepted code is waiting for a reply")]
    NoPendingCode,
}

impl ConnectionError {
    /// Returns true for socket-level failures after which the connection is
    /// unusable.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Connect { .. } | Self::Send { .. } | Self::Receive { .. } | Self::Closed
        )
    }

    /// Returns true when the server rejected the handshake, as opposed to
    /// being unreachable.
    #[must_use]
    pub const fn is_protocol(&self) -> bool {
        matches!(
            self,
            Self::IncompatibleVersion { .. } | Self::ModeRejected { .. }
        )
    }

    /// Returns true when either side found the protocol versions
    /// incompatible.
    #[must_use]
    pub fn is_incompatible_version(&self) -> bool {
        match self {
            Self::IncompatibleVersion { .. } => true,
            Self::ModeRejected { error_type, .. } => error_type == INCOMPATIBLE_VERSION_EXCEPTION,
            _ => false,
        }
    }

    /// Returns the failed command response, if this is a command error.
    #[must_use]
    pub fn as_command_error(&self) -> Option<&CommandError> {
        match self {
            Self::Command(error) => Some(error),
            _ => None,
        }
    }

    /// Returns true when a command was cancelled by the server.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.as_command_error().is_some_and(CommandError::is_cancelled)
    }
}

impl From<CommandError> for ConnectionError {
    fn from(error: CommandError) -> Self {
        Self::Command(Box::new(error))
    }
}

/// A command completed with `success: false`.
///
/// The full response is retained so callers can inspect any partial result
/// the server attached.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", describe(.command, .response))]
pub struct CommandError {
    command: &'static str,
    response: Response<Value>,
}

impl CommandError {
    pub(crate) const fn new(command: &'static str, response: Response<Value>) -> Self {
        Self { command, response }
    }

    /// Name of the failed command.
    #[must_use]
    pub const fn command(&self) -> &'static str {
        self.command
    }

    /// The response as received.
    #[must_use]
    pub const fn response(&self) -> &Response<Value> {
        &self.response
    }

    /// Consumes the error and returns the response.
    #[must_use]
    pub fn into_response(self) -> Response<Value> {
        self.response
    }

    /// Server error type, such as `TaskCanceledException`.
    #[must_use]
    pub fn error_type(&self) -> &str {
        self.response.error_type.as_deref().unwrap_or_default()
    }

    /// Server error message.
    #[must_use]
    pub fn error_message(&self) -> &str {
        self.response.error_message.as_deref().unwrap_or_default()
    }

    /// Returns true when the server cancelled the command; callers usually
    /// treat this as an expected outcome rather than a fault.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.error_type() == TASK_CANCELED_EXCEPTION
    }
}

fn describe(command: &str, response: &Response<Value>) -> String {
    let error_type = response.error_type.as_deref().unwrap_or_default();
    let message = response.error_message.as_deref().unwrap_or_default();
    if error_type == TASK_CANCELED_EXCEPTION {
        message.to_owned()
    } else {
        format!("command {command} failed: {error_type}: {message}")
    }
}
