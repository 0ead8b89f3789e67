//! Handshake messages exchanged when a connection is opened.
//!
//! The server speaks first with a [`ServerInitMessage`]. The client answers
//! with one of the client init messages, which fixes the connection's role
//! for its lifetime, and the server acknowledges with a plain response.

use dsf_types::CodeChannel;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Protocol version implemented by this client.
pub const PROTOCOL_VERSION: i64 = 11;

/// Role of a connection, fixed during the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum ConnectionMode {
    /// Role not yet negotiated.
    Unknown,
    /// Free-form request/response commands.
    Command,
    /// First refusal over codes.
    Intercept,
    /// Object model updates pushed by the server.
    Subscribe,
}

/// Stage of the interception pipeline a connection hooks into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum InterceptionMode {
    /// Before the code is processed internally.
    #[default]
    Pre,
    /// After internal processing, before the firmware sees it.
    Post,
    /// After execution, before the result is returned.
    Executed,
}

/// Shape of the updates sent to a subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum SubscriptionMode {
    /// The full object model every time.
    Full,
    /// Only the changed parts after the initial model.
    #[default]
    Patch,
}

/// Greeting sent by the server as soon as a client connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInitMessage {
    /// Protocol version of the server.
    pub version: i64,
    /// Connection identifier assigned by the server.
    pub id: i64,
}

impl ServerInitMessage {
    /// Returns true when the server speaks at least [`PROTOCOL_VERSION`].
    #[must_use]
    pub const fn is_compatible(&self) -> bool {
        self.version >= PROTOCOL_VERSION
    }
}

/// A client init message selecting a connection role.
pub trait ClientInitMessage: Serialize {
    /// The role requested by this message.
    fn mode(&self) -> ConnectionMode;
}

/// Requests a command connection.
#[derive(Debug, Clone, Serialize)]
pub struct CommandInitMessage {
    mode: ConnectionMode,
    version: i64,
}

impl Default for CommandInitMessage {
    fn default() -> Self {
        Self {
            mode: ConnectionMode::Command,
            version: PROTOCOL_VERSION,
        }
    }
}

impl ClientInitMessage for CommandInitMessage {
    fn mode(&self) -> ConnectionMode {
        self.mode
    }
}

/// Requests an intercepting connection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterceptInitMessage {
    mode: ConnectionMode,
    version: i64,
    interception_mode: InterceptionMode,
    channels: Vec<CodeChannel>,
    filters: Vec<String>,
    priority_codes: bool,
}

impl InterceptInitMessage {
    /// Builds the message; an empty channel list selects every channel.
    #[must_use]
    pub fn new(
        interception_mode: InterceptionMode,
        channels: &[CodeChannel],
        filters: &[String],
        priority_codes: bool,
    ) -> Self {
        let selected = if channels.is_empty() {
            CodeChannel::ALL.as_slice()
        } else {
            channels
        };
        Self {
            mode: ConnectionMode::Intercept,
            version: PROTOCOL_VERSION,
            interception_mode,
            channels: selected.to_vec(),
            filters: filters.to_vec(),
            priority_codes,
        }
    }
}

impl ClientInitMessage for InterceptInitMessage {
    fn mode(&self) -> ConnectionMode {
        self.mode
    }
}

/// Requests a subscription.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeInitMessage {
    mode: ConnectionMode,
    version: i64,
    subscription_mode: SubscriptionMode,
    filters: Vec<String>,
}

impl SubscribeInitMessage {
    /// Builds the message; `filters` are object model paths such as
    /// `heat/**` and may be empty.
    #[must_use]
    pub fn new(subscription_mode: SubscriptionMode, filters: &[String]) -> Self {
        Self {
            mode: ConnectionMode::Subscribe,
            version: PROTOCOL_VERSION,
            subscription_mode,
            filters: filters.to_vec(),
        }
    }
}

impl ClientInitMessage for SubscribeInitMessage {
    fn mode(&self) -> ConnectionMode {
        self.mode
    }
}
