//! Messages that answer the server instead of asking it something.
//!
//! None of these produce a reply, so they only implement [`Request`].

use dsf_types::{Message, MessageType};
use serde::Serialize;

use super::Request;

/// Confirms receipt of an object model update on a subscription.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Acknowledge;

impl Request for Acknowledge {
    const NAME: &'static str = "Acknowledge";
}

/// Cancels the intercepted code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Cancel;

impl Request for Cancel {
    const NAME: &'static str = "Cancel";
}

/// Lets the intercepted code continue unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Ignore;

impl Request for Ignore {
    const NAME: &'static str = "Ignore";
}

/// Completes the intercepted code with the given message instead of
/// executing it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resolve {
    /// Severity of the result.
    #[serde(rename = "type")]
    pub message_type: MessageType,
    /// Result text.
    pub content: String,
}

impl Resolve {
    /// Builds the reply.
    #[must_use]
    pub fn new(message_type: MessageType, content: impl Into<String>) -> Self {
        Self {
            message_type,
            content: content.into(),
        }
    }
}

impl From<&Message> for Resolve {
    fn from(message: &Message) -> Self {
        Self::new(message.message_type, message.content.clone())
    }
}

impl Request for Resolve {
    const NAME: &'static str = "Resolve";
}
