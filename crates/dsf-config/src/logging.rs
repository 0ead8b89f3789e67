//! Log event rendering.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How log events are written to stderr.
///
/// Parsed case-insensitively from `json` or `compact`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogFormat {
    /// Flattened JSON objects, one per line.
    Json,
    /// Terse text lines for people watching a terminal.
    #[default]
    Compact,
}

impl LogFormat {
    /// Returns true when events are meant for a log collector rather than a
    /// person, so terminal colours must stay off.
    #[must_use]
    pub const fn is_machine_readable(self) -> bool {
        matches!(self, Self::Json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_json_is_machine_readable() {
        assert!(LogFormat::Json.is_machine_readable());
        assert!(!LogFormat::Compact.is_machine_readable());
        assert_eq!(LogFormat::Compact.to_string(), "compact");
    }
}
