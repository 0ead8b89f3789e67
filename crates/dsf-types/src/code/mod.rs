//! Parsed G/M/T-codes, comments and conditional keywords.
//!
//! A [`Code`] is received from the control server while intercepting, or
//! built by a client before submission. Its text form is reconstructed
//! byte for byte from the parsed fields by [`Code::short_string`] and the
//! [`Display`](std::fmt::Display) implementation.

mod flags;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::channel::CodeChannel;
use crate::error::UnknownDiscriminant;
use crate::message::CodeResult;
use crate::parameter::{Parameter, UNPRECEDENTED_LETTER};

pub use self::flags::CodeFlags;

const ABSOLUTE_POSITION_PREFIX: &str = "G53 ";

/// Generic kind of a code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeType {
    /// Whole-line comment.
    #[default]
    #[serde(rename = "Q", alias = "C")]
    Comment,
    /// G-code.
    #[serde(rename = "G")]
    GCode,
    /// M-code.
    #[serde(rename = "M")]
    MCode,
    /// T-code.
    #[serde(rename = "T")]
    TCode,
}

impl CodeType {
    /// Returns the letter used for this type in code text.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Comment => 'Q',
            Self::GCode => 'G',
            Self::MCode => 'M',
            Self::TCode => 'T',
        }
    }
}

/// Conditional and meta keywords; numeric on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum KeywordType {
    /// Not a keyword.
    #[default]
    None,
    /// `if`
    If,
    /// `elif`
    ElseIf,
    /// `else`
    Else,
    /// `while`
    While,
    /// `break`
    Break,
    /// `return`; never supported by the firmware.
    Return,
    /// `abort`
    Abort,
    /// `var`
    Var,
    /// `set`
    Set,
    /// `echo`
    Echo,
    /// `continue`
    Continue,
    /// `global`
    Global,
}

impl KeywordType {
    const WIRE_ORDER: [Self; 13] = [
        Self::None,
        Self::If,
        Self::ElseIf,
        Self::Else,
        Self::While,
        Self::Break,
        Self::Return,
        Self::Abort,
        Self::Var,
        Self::Set,
        Self::Echo,
        Self::Continue,
        Self::Global,
    ];

    /// Returns the keyword as written in code text; empty for
    /// [`KeywordType::None`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::If => "if",
            Self::ElseIf => "elif",
            Self::Else => "else",
            Self::While => "while",
            Self::Break => "break",
            Self::Return => "return",
            Self::Abort => "abort",
            Self::Var => "var",
            Self::Set => "set",
            Self::Echo => "echo",
            Self::Continue => "continue",
            Self::Global => "global",
        }
    }
}

impl TryFrom<u8> for KeywordType {
    type Error = UnknownDiscriminant;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::WIRE_ORDER
            .get(usize::from(value))
            .copied()
            .ok_or_else(|| UnknownDiscriminant::new("keyword type", value))
    }
}

impl From<KeywordType> for u8 {
    fn from(value: KeywordType) -> Self {
        value as Self
    }
}

impl fmt::Display for KeywordType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A parsed code, comment or keyword line.
///
/// Parameter letters need not be unique; lookups return the first match.
/// `Clone` copies the parameter list, so a clone may be edited while the
/// original is still being forwarded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Code {
    /// Kind of code.
    #[serde(rename = "type", default)]
    pub code_type: CodeType,
    /// Channel the code was received on or should run on.
    #[serde(default)]
    pub channel: CodeChannel,
    /// Line number in the originating file.
    #[serde(default)]
    pub line_number: Option<i64>,
    /// Whitespace characters preceding the code.
    #[serde(default)]
    pub indent: u8,
    /// Conditional keyword, if any.
    #[serde(default)]
    pub keyword: KeywordType,
    /// Argument following the keyword.
    #[serde(default)]
    pub keyword_argument: Option<String>,
    /// Major number, such as 28 in `G28`.
    #[serde(default)]
    pub major_number: Option<i64>,
    /// Minor number, such as 3 in `G54.3`.
    #[serde(default)]
    pub minor_number: Option<i8>,
    /// Classification flags.
    #[serde(default)]
    pub flags: CodeFlags,
    /// Trailing or whole-line comment.
    #[serde(default)]
    pub comment: Option<String>,
    /// Byte offset in the originating file.
    #[serde(default)]
    pub file_position: Option<i64>,
    /// Length of the original code text in bytes.
    #[serde(default)]
    pub length: Option<i64>,
    /// Ordered parameters.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Connection the code came from; 0 for internal server tasks.
    #[serde(default)]
    pub source_connection: i64,
    /// Messages produced by execution; absent until finished or when
    /// cancelled.
    #[serde(default)]
    pub result: Option<CodeResult>,
}

impl Code {
    /// Returns an empty comment on the default channel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a code of the given type and major number.
    #[must_use]
    pub fn with_number(code_type: CodeType, major_number: i64) -> Self {
        Self {
            code_type,
            major_number: Some(major_number),
            ..Self::default()
        }
    }

    /// Returns true when the major number is present and equal to `number`.
    #[must_use]
    pub fn is_major_number(&self, number: i64) -> bool {
        self.major_number == Some(number)
    }

    /// Returns true when any bit of `flag` is set.
    #[must_use]
    pub const fn has_flag(&self, flag: CodeFlags) -> bool {
        self.flags.bits() & flag.bits() != 0
    }

    /// Returns true when a parameter with `letter` exists (case-insensitive).
    #[must_use]
    pub fn has_parameter(&self, letter: char) -> bool {
        self.parameter(letter).is_some()
    }

    /// Returns the first parameter with `letter`, ignoring case.
    ///
    /// Later parameters with the same letter are never returned.
    #[must_use]
    pub fn parameter(&self, letter: char) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|parameter| parameter.has_letter(letter))
    }

    /// Returns the parameter for `letter`, or `default` when absent.
    #[must_use]
    pub fn parameter_or(&self, letter: char, default: Parameter) -> Parameter {
        self.parameter(letter).cloned().unwrap_or(default)
    }

    /// Replaces the first parameter with `letter`; returns false when none
    /// exists.
    pub fn replace_parameter(&mut self, letter: char, replacement: Parameter) -> bool {
        match self
            .parameters
            .iter_mut()
            .find(|parameter| parameter.has_letter(letter))
        {
            Some(slot) => {
                *slot = replacement;
                true
            }
            None => false,
        }
    }

    /// Removes every parameter with `letter` and returns the first removed.
    pub fn remove_parameter(&mut self, letter: char) -> Option<Parameter> {
        let position = self
            .parameters
            .iter()
            .position(|parameter| parameter.has_letter(letter))?;
        let removed = self.parameters.remove(position);
        self.parameters
            .retain(|parameter| !parameter.has_letter(letter));
        Some(removed)
    }

    /// Reconstructs the parameter text without the code prefix, as used by
    /// codes taking a free-form argument (for example `M117 Hello`).
    #[must_use]
    pub fn unprecedented_string(&self, quote: bool) -> String {
        self.parameters
            .iter()
            .map(|parameter| {
                let mut text = String::new();
                if parameter.letter() != UNPRECEDENTED_LETTER {
                    text.push(parameter.letter());
                }
                if quote && parameter.is_string() {
                    text.push('"');
                    text.push_str(parameter.as_str());
                    text.push('"');
                } else {
                    text.push_str(parameter.as_str());
                }
                text
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Renders only the command portion, such as `G28` or `G53 G1`.
    #[must_use]
    pub fn short_string(&self) -> String {
        if self.keyword != KeywordType::None {
            return self.keyword.as_str().to_owned();
        }
        if self.code_type == CodeType::Comment {
            return "(comment)".to_owned();
        }

        let prefix = if self.has_flag(CodeFlags::ENFORCE_ABSOLUTE_POSITION) {
            ABSOLUTE_POSITION_PREFIX
        } else {
            ""
        };
        let letter = self.code_type.letter();
        match (self.major_number, self.minor_number) {
            (Some(major), Some(minor)) => format!("{prefix}{letter}{major}.{minor}"),
            (Some(major), None) => format!("{prefix}{letter}{major}"),
            (None, _) => format!("{prefix}{letter}"),
        }
    }

    fn comment_text(&self) -> Option<&str> {
        self.comment.as_deref().filter(|comment| !comment.is_empty())
    }
}

impl fmt::Display for Code {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.keyword != KeywordType::None {
            return match self.keyword_argument.as_deref() {
                Some(argument) if !argument.is_empty() => {
                    write!(formatter, "{} {argument}", self.keyword)
                }
                _ => write!(formatter, "{}", self.keyword),
            };
        }
        if self.code_type == CodeType::Comment {
            return write!(formatter, ";{}", self.comment.as_deref().unwrap_or_default());
        }

        formatter.write_str(&self.short_string())?;
        for parameter in &self.parameters {
            write!(formatter, " {parameter}")?;
        }
        if let Some(comment) = self.comment_text() {
            write!(formatter, " ;{comment}")?;
        }
        if let Some(result) = self.result.as_ref().filter(|result| !result.is_empty()) {
            write!(formatter, " => {}", result.to_string().trim_end())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
