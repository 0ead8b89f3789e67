//! Messages and update status.

use dsf_types::{LogLevel, MessageType};
use serde::Serialize;
use serde::de::IgnoredAny;

use super::command;

/// Writes a message to the console and optionally the log file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteMessage {
    /// Severity.
    #[serde(rename = "type")]
    pub message_type: MessageType,
    /// Message text.
    pub content: String,
    /// Whether the message is shown to clients.
    pub output_message: bool,
    /// Whether the message is written to the log file.
    pub log_message: bool,
    /// Log level; the server picks one from the severity when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,
}

impl WriteMessage {
    /// Builds a message that is shown but only logged when `log_level` is
    /// given.
    #[must_use]
    pub fn new(
        message_type: MessageType,
        content: impl Into<String>,
        log_level: Option<LogLevel>,
    ) -> Self {
        Self {
            message_type,
            content: content.into(),
            output_message: true,
            log_message: log_level.is_some_and(|level| level != LogLevel::Off),
            log_level,
        }
    }
}

command!(WriteMessage => IgnoredAny);

/// Overrides the machine status while a software update runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SetUpdateStatus {
    /// Whether an update is in progress.
    pub updating: bool,
}

command!(SetUpdateStatus => IgnoredAny);
