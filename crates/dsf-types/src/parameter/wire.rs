//! JSON shape of a parameter as exchanged with the control server.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{Parameter, ParameterError};

/// `{letter, value, isString, isDriverId}` with the value carried as text.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WireParameter {
    letter: String,
    #[serde(default, deserialize_with = "value_text")]
    value: String,
    #[serde(default, deserialize_with = "flag")]
    is_string: bool,
    #[serde(default, deserialize_with = "flag")]
    is_driver_id: bool,
}

impl TryFrom<WireParameter> for Parameter {
    type Error = ParameterError;

    fn try_from(wire: WireParameter) -> Result<Self, Self::Error> {
        let letter = wire
            .letter
            .chars()
            .next()
            .unwrap_or(super::UNPRECEDENTED_LETTER);
        Self::parse(letter, wire.value, wire.is_string, wire.is_driver_id)
    }
}

impl From<Parameter> for WireParameter {
    fn from(parameter: Parameter) -> Self {
        Self {
            letter: parameter.letter.to_string(),
            value: parameter.raw,
            is_string: parameter.is_string,
            is_driver_id: parameter.is_driver_id,
        }
    }
}

/// Accepts `true`/`false` as well as the numeric `1`/`0` some servers send.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(value) => value,
        Value::Number(number) => number.as_u64() == Some(1),
        _ => false,
    })
}

/// Accepts the canonical text form and tolerates already-typed values.
fn value_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(render_value(&Value::deserialize(deserializer)?))
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(render_value)
            .collect::<Vec<_>>()
            .join(":"),
        other => other.to_string(),
    }
}
