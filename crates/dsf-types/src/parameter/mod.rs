//! Typed code parameters.
//!
//! A [`Parameter`] pairs a letter with the raw text that followed it in the
//! code and a [`ParameterValue`] inferred from that text once, at
//! construction. Inference runs in a fixed order:
//!
//! 1. driver identifiers (`"port"`, `"board.port"`, `:`-separated lists),
//! 2. quoted strings, kept verbatim,
//! 3. blank text, read as integer `0`,
//! 4. brace-delimited expressions, kept as text for the server to evaluate,
//! 5. `:`-separated lists (floats when the text contains `.`, otherwise
//!    signed, then unsigned integers),
//! 6. scalars: signed integer, unsigned integer, float, then plain text.
//!
//! The order decides which representation a value round-trips through, so
//! `"-1"` stays signed, `"1.0"` stays a float, and `"18446744073709551615"`
//! only fits the unsigned representation.

mod wire;

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

use crate::driver_id::{DriverId, DriverIdError};

use self::wire::WireParameter;

/// Letter used for values that are not preceded by a parameter letter.
pub const UNPRECEDENTED_LETTER: char = '@';

const LIST_SEPARATOR: char = ':';
const FRACTION_MARKER: char = '.';
const QUOTE: char = '"';
/// Integers of this magnitude or below convert to `f64` exactly.
const MAX_EXACT_FLOAT_INTEGER: u64 = (1 << 53) - 1;

/// Typed value inferred from a parameter's raw text.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    /// Signed integer.
    Int(i64),
    /// Unsigned integer too large for `i64`.
    UInt(u64),
    /// Floating point number.
    Float(f64),
    /// Plain text, quoted string, or unevaluated expression.
    Text(String),
    /// `:`-separated signed integers.
    IntList(Vec<i64>),
    /// `:`-separated unsigned integers.
    UIntList(Vec<u64>),
    /// `:`-separated floats.
    FloatList(Vec<f64>),
    /// Single driver identifier.
    DriverId(DriverId),
    /// `:`-separated driver identifiers.
    DriverIdList(Vec<DriverId>),
}

impl ParameterValue {
    /// Returns the kind of value stored.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Int(_) => ValueKind::Int,
            Self::UInt(_) => ValueKind::UInt,
            Self::Float(_) => ValueKind::Float,
            Self::Text(_) => ValueKind::Text,
            Self::IntList(_) => ValueKind::IntList,
            Self::UIntList(_) => ValueKind::UIntList,
            Self::FloatList(_) => ValueKind::FloatList,
            Self::DriverId(_) => ValueKind::DriverId,
            Self::DriverIdList(_) => ValueKind::DriverIdList,
        }
    }
}

/// Discriminant of a [`ParameterValue`], used in conversion errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ValueKind {
    /// Signed integer.
    #[strum(serialize = "int64")]
    Int,
    /// Unsigned integer.
    #[strum(serialize = "uint64")]
    UInt,
    /// Float.
    #[strum(serialize = "float64")]
    Float,
    /// Text.
    #[strum(serialize = "string")]
    Text,
    /// Signed integer list.
    #[strum(serialize = "int64 list")]
    IntList,
    /// Unsigned integer list.
    #[strum(serialize = "uint64 list")]
    UIntList,
    /// Float list.
    #[strum(serialize = "float64 list")]
    FloatList,
    /// Driver identifier.
    #[strum(serialize = "driver id")]
    DriverId,
    /// Driver identifier list.
    #[strum(serialize = "driver id list")]
    DriverIdList,
}

/// Errors raised while parsing or reading parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    /// The stored value cannot be read as the requested type.
    #[error("cannot convert parameter {letter} to {target} (value '{value}' of type {kind})")]
    Conversion {
        /// Parameter letter.
        letter: char,
        /// Raw text of the parameter.
        value: String,
        /// Kind of value actually stored.
        kind: ValueKind,
        /// Requested type.
        target: &'static str,
    },
    /// A driver identifier segment was not an integer.
    #[error("parameter {letter} has an invalid driver id: {source}")]
    InvalidDriverId {
        /// Parameter letter.
        letter: char,
        /// Underlying driver id failure.
        #[source]
        source: DriverIdError,
    },
}

/// A single code parameter: a letter, its raw text, and the inferred value.
///
/// Parameters are immutable; replacing a value means constructing a new
/// parameter and swapping it into the owning code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireParameter", into = "WireParameter")]
pub struct Parameter {
    letter: char,
    raw: String,
    is_string: bool,
    is_expression: bool,
    is_driver_id: bool,
    value: ParameterValue,
}

impl Parameter {
    /// Parses raw parameter text into a typed parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::InvalidDriverId`] when `is_driver_id` is set
    /// and any list item is not a `"port"` or `"board.port"` pair.
    ///
    /// # Examples
    ///
    /// ```
    /// use dsf_types::{Parameter, ParameterValue};
    ///
    /// let parameter = Parameter::parse('X', "1:2:3", false, false)?;
    /// assert_eq!(parameter.value(), &ParameterValue::IntList(vec![1, 2, 3]));
    /// assert_eq!(parameter.to_string(), "X1:2:3");
    /// # Ok::<(), dsf_types::ParameterError>(())
    /// ```
    pub fn parse(
        letter: char,
        raw: impl Into<String>,
        is_string: bool,
        is_driver_id: bool,
    ) -> Result<Self, ParameterError> {
        let raw_text: String = raw.into();
        let trimmed = raw_text.trim();
        let is_expression = is_expression_text(trimmed);

        let value = if is_expression {
            ParameterValue::Text(raw_text.clone())
        } else if is_driver_id {
            parse_driver_ids(letter, trimmed)?
        } else if is_string {
            ParameterValue::Text(raw_text.clone())
        } else {
            infer_value(trimmed)
        };

        Ok(Self {
            letter,
            raw: raw_text,
            is_string,
            is_expression,
            is_driver_id,
            value,
        })
    }

    /// Parses a surface token such as `X12.5`, `S"text"` or a bare value.
    ///
    /// Tokens not starting with an ASCII letter are treated as letterless
    /// values. Quoted text is unescaped (`""` becomes `"`) and marked as a
    /// string.
    ///
    /// # Errors
    ///
    /// Never fails for tokens without driver ids; the signature mirrors
    /// [`Parameter::parse`].
    pub fn from_token(token: &str) -> Result<Self, ParameterError> {
        let mut chars = token.chars();
        let (letter, rest) = match chars.next() {
            Some(first) if first.is_ascii_alphabetic() => (first, chars.as_str()),
            _ => (UNPRECEDENTED_LETTER, token),
        };
        match rest
            .strip_prefix(QUOTE)
            .and_then(|inner| inner.strip_suffix(QUOTE))
        {
            Some(inner) => Self::parse(letter, inner.replace("\"\"", "\""), true, false),
            None => Self::parse(letter, rest, false, false),
        }
    }

    /// Builds a signed integer parameter.
    #[must_use]
    pub fn integer(letter: char, value: i64) -> Self {
        Self::numeric(letter, value.to_string())
    }

    /// Builds an unsigned integer parameter. Values within `i64` range are
    /// stored as signed integers, exactly as parsing their text would.
    #[must_use]
    pub fn unsigned(letter: char, value: u64) -> Self {
        Self::numeric(letter, value.to_string())
    }

    /// Builds a float parameter. Whole numbers keep a trailing `.0` so the
    /// text reparses as a float.
    #[must_use]
    pub fn float(letter: char, value: f64) -> Self {
        Self::numeric(letter, format!("{value:?}"))
    }

    /// Builds a quoted string parameter.
    #[must_use]
    pub fn string(letter: char, value: impl Into<String>) -> Self {
        let text: String = value.into();
        Self {
            letter,
            is_string: true,
            is_expression: is_expression_text(text.trim()),
            is_driver_id: false,
            value: ParameterValue::Text(text.clone()),
            raw: text,
        }
    }

    /// Builds a driver id parameter.
    #[must_use]
    pub fn driver_id(letter: char, value: DriverId) -> Self {
        Self {
            letter,
            raw: value.to_string(),
            is_string: false,
            is_expression: false,
            is_driver_id: true,
            value: ParameterValue::DriverId(value),
        }
    }

    fn numeric(letter: char, raw: String) -> Self {
        Self {
            letter,
            value: infer_value(&raw),
            raw,
            is_string: false,
            is_expression: false,
            is_driver_id: false,
        }
    }

    /// Returns the parameter letter, or [`UNPRECEDENTED_LETTER`].
    #[must_use]
    pub const fn letter(&self) -> char {
        self.letter
    }

    /// Returns true when the letter matches, ignoring ASCII case.
    #[must_use]
    pub const fn has_letter(&self, letter: char) -> bool {
        self.letter.eq_ignore_ascii_case(&letter)
    }

    /// Returns the inferred value.
    #[must_use]
    pub const fn value(&self) -> &ParameterValue {
        &self.value
    }

    /// Returns true when the parameter was given as a quoted string.
    #[must_use]
    pub const fn is_string(&self) -> bool {
        self.is_string
    }

    /// Returns true when the raw text is a brace-delimited expression.
    #[must_use]
    pub const fn is_expression(&self) -> bool {
        self.is_expression
    }

    /// Returns true when the parameter holds driver identifiers.
    #[must_use]
    pub const fn is_driver_id(&self) -> bool {
        self.is_driver_id
    }

    /// Returns the raw text verbatim. Never fails.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Reads the value as a signed integer.
    ///
    /// # Errors
    ///
    /// Fails unless the value is a signed integer or an unsigned integer
    /// within `i64` range.
    pub fn as_i64(&self) -> Result<i64, ParameterError> {
        match &self.value {
            ParameterValue::Int(value) => Ok(*value),
            ParameterValue::UInt(value) => {
                i64::try_from(*value).map_err(|_| self.conversion_error("int64"))
            }
            _ => Err(self.conversion_error("int64")),
        }
    }

    /// Reads the value as an unsigned integer.
    ///
    /// Driver ids read as their packed `(board << 16) | port` form.
    ///
    /// # Errors
    ///
    /// Fails for negative integers and non-integer kinds.
    pub fn as_u64(&self) -> Result<u64, ParameterError> {
        match &self.value {
            ParameterValue::UInt(value) => Ok(*value),
            ParameterValue::Int(value) => {
                u64::try_from(*value).map_err(|_| self.conversion_error("uint64"))
            }
            ParameterValue::DriverId(id) => Ok(u64::from(id.packed())),
            _ => Err(self.conversion_error("uint64")),
        }
    }

    /// Reads the value as a float.
    ///
    /// # Errors
    ///
    /// Fails for non-numeric kinds and for integers beyond the range `f64`
    /// represents exactly.
    pub fn as_f64(&self) -> Result<f64, ParameterError> {
        match &self.value {
            ParameterValue::Float(value) => Ok(*value),
            ParameterValue::Int(value) => {
                exact_float_from_i64(*value).ok_or_else(|| self.conversion_error("float64"))
            }
            ParameterValue::UInt(value) => {
                exact_float_from_u64(*value).ok_or_else(|| self.conversion_error("float64"))
            }
            _ => Err(self.conversion_error("float64")),
        }
    }

    /// Reads the value as a driver identifier.
    ///
    /// # Errors
    ///
    /// Fails unless the value is a driver id or a packed integer fitting in
    /// 32 bits.
    pub fn as_driver_id(&self) -> Result<DriverId, ParameterError> {
        match &self.value {
            ParameterValue::DriverId(id) => Ok(*id),
            ParameterValue::UInt(value) => u32::try_from(*value)
                .map(DriverId::from_packed)
                .map_err(|_| self.conversion_error("driver id")),
            ParameterValue::Int(value) => u32::try_from(*value)
                .map(DriverId::from_packed)
                .map_err(|_| self.conversion_error("driver id")),
            _ => Err(self.conversion_error("driver id")),
        }
    }

    /// Reads the raw text as a boolean.
    ///
    /// Accepts `1`, `t`, `T`, `TRUE`, `true`, `True` and their `0`/`f`/`false`
    /// counterparts.
    ///
    /// # Errors
    ///
    /// Fails for any other text.
    pub fn as_bool(&self) -> Result<bool, ParameterError> {
        match self.raw.trim() {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
            _ => Err(self.conversion_error("bool")),
        }
    }

    /// Reads the value as a list of signed integers.
    ///
    /// # Errors
    ///
    /// Fails unless every element is a signed integer or an unsigned integer
    /// within `i64` range.
    pub fn as_i64_list(&self) -> Result<Vec<i64>, ParameterError> {
        let converted = match &self.value {
            ParameterValue::IntList(values) => Some(values.clone()),
            ParameterValue::Int(value) => Some(vec![*value]),
            ParameterValue::UIntList(values) => convert_all(values, |value| {
                i64::try_from(*value).ok()
            }),
            ParameterValue::UInt(value) => i64::try_from(*value).ok().map(|item| vec![item]),
            _ => None,
        };
        converted.ok_or_else(|| self.conversion_error("int64 list"))
    }

    /// Reads the value as a list of unsigned integers.
    ///
    /// # Errors
    ///
    /// Fails for negative elements and non-integer kinds.
    pub fn as_u64_list(&self) -> Result<Vec<u64>, ParameterError> {
        let converted = match &self.value {
            ParameterValue::UIntList(values) => Some(values.clone()),
            ParameterValue::UInt(value) => Some(vec![*value]),
            ParameterValue::IntList(values) => convert_all(values, |value| {
                u64::try_from(*value).ok()
            }),
            ParameterValue::Int(value) => u64::try_from(*value).ok().map(|item| vec![item]),
            ParameterValue::DriverIdList(ids) => {
                Some(ids.iter().map(|id| u64::from(id.packed())).collect())
            }
            ParameterValue::DriverId(id) => Some(vec![u64::from(id.packed())]),
            _ => None,
        };
        converted.ok_or_else(|| self.conversion_error("uint64 list"))
    }

    /// Reads the value as a list of floats.
    ///
    /// # Errors
    ///
    /// Fails for non-numeric kinds and for integers beyond the range `f64`
    /// represents exactly.
    pub fn as_f64_list(&self) -> Result<Vec<f64>, ParameterError> {
        let converted = match &self.value {
            ParameterValue::FloatList(values) => Some(values.clone()),
            ParameterValue::Float(value) => Some(vec![*value]),
            ParameterValue::IntList(values) => {
                convert_all(values, |value| exact_float_from_i64(*value))
            }
            ParameterValue::Int(value) => exact_float_from_i64(*value).map(|item| vec![item]),
            ParameterValue::UIntList(values) => {
                convert_all(values, |value| exact_float_from_u64(*value))
            }
            ParameterValue::UInt(value) => exact_float_from_u64(*value).map(|item| vec![item]),
            _ => None,
        };
        converted.ok_or_else(|| self.conversion_error("float64 list"))
    }

    /// Reads the value as a list of driver identifiers.
    ///
    /// # Errors
    ///
    /// Fails unless the value holds driver ids or packed integers fitting in
    /// 32 bits.
    pub fn as_driver_id_list(&self) -> Result<Vec<DriverId>, ParameterError> {
        let converted = match &self.value {
            ParameterValue::DriverIdList(ids) => Some(ids.clone()),
            ParameterValue::DriverId(id) => Some(vec![*id]),
            ParameterValue::UIntList(values) => convert_all(values, |value| {
                u32::try_from(*value).ok().map(DriverId::from_packed)
            }),
            ParameterValue::UInt(value) => u32::try_from(*value)
                .ok()
                .map(|packed| vec![DriverId::from_packed(packed)]),
            _ => None,
        };
        converted.ok_or_else(|| self.conversion_error("driver id list"))
    }

    fn conversion_error(&self, target: &'static str) -> ParameterError {
        ParameterError::Conversion {
            letter: self.letter,
            value: self.raw.clone(),
            kind: self.value.kind(),
            target,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.letter != UNPRECEDENTED_LETTER {
            write!(formatter, "{}", self.letter)?;
        }
        if self.is_string && !self.is_expression {
            write!(formatter, "\"{}\"", self.raw.replace('"', "\"\""))
        } else {
            formatter.write_str(&self.raw)
        }
    }
}

fn is_expression_text(text: &str) -> bool {
    text.len() > 1 && text.starts_with('{') && text.ends_with('}')
}

fn parse_driver_ids(letter: char, text: &str) -> Result<ParameterValue, ParameterError> {
    let ids = text
        .split(LIST_SEPARATOR)
        .map(str::parse::<DriverId>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| ParameterError::InvalidDriverId { letter, source })?;
    match ids.as_slice() {
        [single] => Ok(ParameterValue::DriverId(*single)),
        _ => Ok(ParameterValue::DriverIdList(ids)),
    }
}

fn infer_value(text: &str) -> ParameterValue {
    if text.is_empty() {
        return ParameterValue::Int(0);
    }
    if text.contains(LIST_SEPARATOR) {
        return infer_list(text);
    }
    if let Ok(value) = text.parse::<i64>() {
        ParameterValue::Int(value)
    } else if let Ok(value) = text.parse::<u64>() {
        ParameterValue::UInt(value)
    } else if let Ok(value) = text.parse::<f64>() {
        ParameterValue::Float(value)
    } else {
        ParameterValue::Text(text.to_owned())
    }
}

/// Chooses the list representation from the whole text: any `.` anywhere
/// selects floats for every element. Elements are not trimmed, so spaces
/// around a separator leave the list as text.
fn infer_list(text: &str) -> ParameterValue {
    let items: Vec<&str> = text.split(LIST_SEPARATOR).collect();
    if text.contains(FRACTION_MARKER) {
        if let Some(values) = parse_all::<f64>(&items) {
            return ParameterValue::FloatList(values);
        }
    } else if let Some(values) = parse_all::<i64>(&items) {
        return ParameterValue::IntList(values);
    } else if let Some(values) = parse_all::<u64>(&items) {
        return ParameterValue::UIntList(values);
    }
    ParameterValue::Text(text.to_owned())
}

fn parse_all<T: std::str::FromStr>(items: &[&str]) -> Option<Vec<T>> {
    items.iter().map(|item| item.parse::<T>().ok()).collect()
}

fn convert_all<S, T>(values: &[S], convert: impl Fn(&S) -> Option<T>) -> Option<Vec<T>> {
    values.iter().map(convert).collect()
}

#[expect(
    clippy::cast_precision_loss,
    reason = "magnitude is checked against the exact integer range of f64"
)]
fn exact_float_from_i64(value: i64) -> Option<f64> {
    (value.unsigned_abs() <= MAX_EXACT_FLOAT_INTEGER).then_some(value as f64)
}

#[expect(
    clippy::cast_precision_loss,
    reason = "magnitude is checked against the exact integer range of f64"
)]
fn exact_float_from_u64(value: u64) -> Option<f64> {
    (value <= MAX_EXACT_FLOAT_INTEGER).then_some(value as f64)
}

#[cfg(test)]
mod tests;
