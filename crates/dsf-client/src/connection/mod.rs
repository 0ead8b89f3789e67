//! Connections to the control server.
//!
//! Opening a connection walks a fixed handshake: dial the socket, read the
//! server greeting, check its protocol version, send the client init
//! message and wait for the acknowledgement. The role chosen by the init
//! message then stays fixed. [`CommandConnection`], [`SubscribeConnection`]
//! and [`InterceptConnection`] wrap a ready [`Connection`] with the
//! operations their role allows.

mod command;
mod intercept;
mod subscribe;

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::codec::{JsonStream, SocketCloser};
use crate::commands::{Command, Request, Response, envelope};
use crate::error::ConnectionError;
use crate::init::{ClientInitMessage, ConnectionMode, PROTOCOL_VERSION, ServerInitMessage};

pub use self::command::{CommandConnection, CommandSession};
pub use self::intercept::{InterceptConnection, InterceptOptions};
pub use self::subscribe::{SubscribeConnection, SubscribeOptions};

const CONNECTION_TARGET: &str = "dsf_client::connection";

/// Handshake stage, reported in debug events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Unconnected,
    AwaitingGreeting,
    AwaitingModeAck,
    Ready,
}

/// A connection that completed the handshake.
#[derive(Debug)]
pub struct Connection {
    stream: JsonStream,
    id: i64,
    protocol_version: i64,
    mode: ConnectionMode,
}

impl Connection {
    /// Dials `path` and performs the handshake with `init`.
    ///
    /// A server older than [`PROTOCOL_VERSION`] is rejected before the init
    /// message is sent.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the socket fails,
    /// [`ConnectionError::IncompatibleVersion`] for an old server and
    /// [`ConnectionError::ModeRejected`] when the server refuses the role.
    pub fn open<I>(path: &Path, init: &I) -> Result<Self, ConnectionError>
    where
        I: ClientInitMessage,
    {
        let mode = init.mode();
        transition(mode, Stage::Unconnected, Stage::AwaitingGreeting);
        let mut stream = JsonStream::connect(path)?;

        let greeting: ServerInitMessage = stream.receive()?.ok_or(ConnectionError::Closed)?;
        if !greeting.is_compatible() {
            return Err(ConnectionError::IncompatibleVersion {
                required: PROTOCOL_VERSION,
                server: greeting.version,
            });
        }
        transition(mode, Stage::AwaitingGreeting, Stage::AwaitingModeAck);

        stream.send(init)?;
        let ack: Response<Value> = stream.receive()?.ok_or(ConnectionError::Closed)?;
        if !ack.success {
            return Err(ConnectionError::ModeRejected {
                mode,
                error_type: ack.error_type.unwrap_or_default(),
                error_message: ack.error_message.unwrap_or_default(),
            });
        }
        transition(mode, Stage::AwaitingModeAck, Stage::Ready);
        debug!(
            target: CONNECTION_TARGET,
            id = greeting.id,
            version = greeting.version,
            %mode,
            "connection established"
        );

        Ok(Self {
            stream,
            id: greeting.id,
            protocol_version: greeting.version,
            mode,
        })
    }

    /// Identifier assigned by the server.
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }

    /// Protocol version advertised by the server.
    #[must_use]
    pub const fn protocol_version(&self) -> i64 {
        self.protocol_version
    }

    /// Negotiated role.
    #[must_use]
    pub const fn mode(&self) -> ConnectionMode {
        self.mode
    }

    /// Returns a handle that closes this connection from another thread.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Receive`] when the socket cannot be
    /// duplicated.
    pub fn closer(&self) -> Result<SocketCloser, ConnectionError> {
        self.stream.closer()
    }

    /// Shuts the socket down. Blocked reads on other handles return.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Send`] when the socket cannot be shut
    /// down.
    pub fn close(&self) -> Result<(), ConnectionError> {
        self.stream
            .close()
            .map_err(|source| ConnectionError::Send { source })
    }

    /// Sends a request that expects no reply.
    ///
    /// # Errors
    ///
    /// Returns an encode or transport error.
    pub fn send<R>(&mut self, request: &R) -> Result<(), ConnectionError>
    where
        R: Request + ?Sized,
    {
        let message = envelope(request)?;
        self.stream.send(&message)
    }

    /// Reads the next message, or `None` when the server closed the stream.
    ///
    /// # Errors
    ///
    /// Returns a transport or decode error.
    pub fn receive<T>(&mut self) -> Result<Option<T>, ConnectionError>
    where
        T: serde::de::DeserializeOwned,
    {
        self.stream.receive()
    }

    /// Sends `command` and waits for its response, returned as received.
    ///
    /// # Errors
    ///
    /// Returns an encode, transport or decode error, or
    /// [`ConnectionError::Closed`] when the stream ends first.
    pub fn perform_raw<C>(&mut self, command: &C) -> Result<Response<Value>, ConnectionError>
    where
        C: Command + ?Sized,
    {
        self.send(command)?;
        self.receive()?.ok_or(ConnectionError::Closed)
    }

    /// Sends `command` and decodes the result of a successful response.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Command`] when the server reports a
    /// failure, plus the errors of [`Connection::perform_raw`].
    pub fn perform_command<C>(&mut self, command: &C) -> Result<C::Output, ConnectionError>
    where
        C: Command + ?Sized,
    {
        self.perform_raw(command)?.into_output::<C>()
    }
}

fn transition(mode: ConnectionMode, from: Stage, to: Stage) {
    debug!(
        target: CONNECTION_TARGET,
        %mode,
        from = ?from,
        to = ?to,
        "handshake stage changed"
    );
}
