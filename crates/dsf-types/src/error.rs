//! Shared error types for wire enumerations.

use thiserror::Error;

/// A numeric wire value did not match any known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} {value}")]
pub struct UnknownDiscriminant {
    kind: &'static str,
    value: u8,
}

impl UnknownDiscriminant {
    pub(crate) const fn new(kind: &'static str, value: u8) -> Self {
        Self { kind, value }
    }

    /// Returns the rejected wire value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.value
    }
}
