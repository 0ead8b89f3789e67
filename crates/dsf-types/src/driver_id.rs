//! Driver identifiers addressing a stepper or heater driver.
//!
//! A driver is addressed by the expansion board it lives on and the port on
//! that board. On the wire both halves travel packed into one integer as
//! `(board << 16) | port`; in code text they appear as `"port"` or
//! `"board.port"`.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const BOARD_SEPARATOR: char = '.';
const PORT_MASK: u32 = 0xFFFF;

/// A `(board, port)` pair identifying a driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DriverId {
    board: u16,
    port: u16,
}

impl DriverId {
    /// Builds a driver identifier from its board and port.
    #[must_use]
    pub const fn new(board: u16, port: u16) -> Self {
        Self { board, port }
    }

    /// Unpacks a `(board << 16) | port` wire value.
    #[must_use]
    pub fn from_packed(value: u32) -> Self {
        let board = u16::try_from(value >> 16).unwrap_or(u16::MAX);
        let port = u16::try_from(value & PORT_MASK).unwrap_or(u16::MAX);
        Self { board, port }
    }

    /// Returns the expansion board number (0 for the main board).
    #[must_use]
    pub const fn board(self) -> u16 {
        self.board
    }

    /// Returns the port on the board.
    #[must_use]
    pub const fn port(self) -> u16 {
        self.port
    }

    /// Packs the identifier as `(board << 16) | port`.
    #[must_use]
    pub fn packed(self) -> u32 {
        (u32::from(self.board) << 16) | u32::from(self.port)
    }
}

impl fmt::Display for DriverId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}.{}", self.board, self.port)
    }
}

impl FromStr for DriverId {
    type Err = DriverIdError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let text = input.trim();
        if text.is_empty() {
            return Ok(Self::default());
        }
        match text.split_once(BOARD_SEPARATOR) {
            Some((board, port)) => Ok(Self::new(
                parse_segment(board, text)?,
                parse_segment(port, text)?,
            )),
            None => Ok(Self::new(0, parse_segment(text, text)?)),
        }
    }
}

fn parse_segment(segment: &str, text: &str) -> Result<u16, DriverIdError> {
    segment
        .trim()
        .parse::<u16>()
        .map_err(|source| DriverIdError::InvalidSegment {
            text: text.to_owned(),
            source,
        })
}

/// Errors raised while parsing a [`DriverId`] from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverIdError {
    /// The board or port segment was not an unsigned 16-bit integer.
    #[error("invalid driver id '{text}': {source}")]
    InvalidSegment {
        /// Full text that failed to parse.
        text: String,
        /// Integer parse failure for the offending segment.
        #[source]
        source: ParseIntError,
    },
}

impl Serialize for DriverId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.packed())
    }
}

impl<'de> Deserialize<'de> for DriverId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DriverIdVisitor)
    }
}

struct DriverIdVisitor;

impl Visitor<'_> for DriverIdVisitor {
    type Value = DriverId;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a packed driver id or \"board.port\" text")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        u32::try_from(value)
            .map(DriverId::from_packed)
            .map_err(|_| E::custom(format!("driver id {value} exceeds 32 bits")))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        u32::try_from(value)
            .map(DriverId::from_packed)
            .map_err(|_| E::custom(format!("driver id {value} is out of range")))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        value.parse().map_err(E::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2.5", DriverId::new(2, 5))]
    #[case("5", DriverId::new(0, 5))]
    #[case(" 1.0 ", DriverId::new(1, 0))]
    #[case("", DriverId::default())]
    fn parses_driver_id_text(#[case] text: &str, #[case] expected: DriverId) {
        assert_eq!(text.parse::<DriverId>().expect("valid driver id"), expected);
    }

    #[rstest]
    #[case("x")]
    #[case("1.2.3")]
    #[case("1.")]
    #[case("70000")]
    fn rejects_malformed_driver_ids(#[case] text: &str) {
        let error = text.parse::<DriverId>().expect_err("should fail");
        assert!(matches!(error, DriverIdError::InvalidSegment { .. }));
    }

    #[test]
    fn packs_board_into_upper_half() {
        let id = DriverId::new(2, 5);
        assert_eq!(id.packed(), 131_077);
        assert_eq!(DriverId::from_packed(131_077), id);
    }

    #[test]
    fn displays_board_and_port() {
        assert_eq!(DriverId::new(3, 1).to_string(), "3.1");
    }

    #[test]
    fn deserialises_packed_and_textual_forms() {
        let packed: DriverId = serde_json::from_str("65537").expect("packed id");
        let text: DriverId = serde_json::from_str("\"1.1\"").expect("textual id");
        assert_eq!(packed, text);
        assert_eq!(serde_json::to_string(&packed).expect("serialise"), "65537");
    }
}
