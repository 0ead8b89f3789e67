//! Firmware-style messages and code results.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::UnknownDiscriminant;

/// Severity of a [`Message`]; numeric on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MessageType {
    /// Informational or success message.
    #[default]
    Success,
    /// Warning.
    Warning,
    /// Error.
    Error,
}

impl TryFrom<u8> for MessageType {
    type Error = UnknownDiscriminant;

    fn try_from(value: u8) -> Result<Self, UnknownDiscriminant> {
        match value {
            0 => Ok(Self::Success),
            1 => Ok(Self::Warning),
            2 => Ok(Self::Error),
            other => Err(UnknownDiscriminant::new("message type", other)),
        }
    }
}

impl From<MessageType> for u8 {
    fn from(value: MessageType) -> Self {
        match value {
            MessageType::Success => 0,
            MessageType::Warning => 1,
            MessageType::Error => 2,
        }
    }
}

/// A timestamped message as produced by the firmware or control server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Creation time as sent by the server (ISO 8601), if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Severity.
    #[serde(rename = "type", default)]
    pub message_type: MessageType,
    /// Message text.
    #[serde(default)]
    pub content: String,
}

impl Message {
    /// Builds an untimed message.
    #[must_use]
    pub fn new(message_type: MessageType, content: impl Into<String>) -> Self {
        Self {
            time: None,
            message_type,
            content: content.into(),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message_type {
            MessageType::Error => write!(formatter, "Error: {}", self.content),
            MessageType::Warning => write!(formatter, "Warning: {}", self.content),
            MessageType::Success => formatter.write_str(&self.content),
        }
    }
}

/// Ordered messages produced while executing a code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeResult(pub Vec<Message>);

impl CodeResult {
    /// Returns true when no messages were produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the messages.
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.0.iter()
    }

    /// Returns true when any message is an error.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.0
            .iter()
            .any(|message| message.message_type == MessageType::Error)
    }
}

impl From<Vec<Message>> for CodeResult {
    fn from(messages: Vec<Message>) -> Self {
        Self(messages)
    }
}

impl fmt::Display for CodeResult {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for message in self.0.iter().filter(|message| !message.content.is_empty()) {
            writeln!(formatter, "{message}")?;
        }
        Ok(())
    }
}

/// Log level attached to messages written through the control server.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogLevel {
    /// Log everything, including debug output.
    Debug,
    /// Log informational messages and above.
    Info,
    /// Log warnings and errors only.
    Warn,
    /// Do not log.
    #[default]
    Off,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_firmware_style_prefixes() {
        assert_eq!(Message::new(MessageType::Error, "x").to_string(), "Error: x");
        assert_eq!(
            Message::new(MessageType::Warning, "y").to_string(),
            "Warning: y"
        );
        assert_eq!(Message::new(MessageType::Success, "z").to_string(), "z");
    }

    #[test]
    fn code_result_skips_empty_messages() {
        let result = CodeResult::from(vec![
            Message::new(MessageType::Success, ""),
            Message::new(MessageType::Warning, "hot"),
            Message::new(MessageType::Success, "ok"),
        ]);
        assert_eq!(result.to_string(), "Warning: hot\nok\n");
        assert!(!result.has_error());
    }

    #[test]
    fn message_type_is_numeric_on_the_wire() {
        let message: Message =
            serde_json::from_str(r#"{"time":"2024-01-01T00:00:00","type":2,"content":"bad"}"#)
                .expect("message json");
        assert_eq!(message.message_type, MessageType::Error);
        let json = serde_json::to_value(&message).expect("serialise");
        assert_eq!(json["type"], 2);
    }

    #[test]
    fn rejects_unknown_message_types() {
        assert!(serde_json::from_str::<Message>(r#"{"type":9,"content":""}"#).is_err());
    }
}
