//! Bit flags classifying codes.

use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Set of [`Code`](super::Code) classification flags; an integer bitmask on
/// the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeFlags(u32);

impl CodeFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Finished as soon as it enters the code queue.
    pub const ASYNCHRONOUS: Self = Self(1);
    /// Already seen by pre-processing interceptors.
    pub const IS_PRE_PROCESSED: Self = Self(1 << 1);
    /// Already seen by post-processing interceptors.
    pub const IS_POST_PROCESSED: Self = Self(1 << 2);
    /// Originates from a macro file.
    pub const IS_FROM_MACRO: Self = Self(1 << 3);
    /// Originates from a macro called by a system macro.
    pub const IS_NESTED_MACRO: Self = Self(1 << 4);
    /// Originates from `config.g`.
    pub const IS_FROM_CONFIG: Self = Self(1 << 5);
    /// Originates from `config-override.g`.
    pub const IS_FROM_CONFIG_OVERRIDE: Self = Self(1 << 6);
    /// Prefixed with `G53`.
    pub const ENFORCE_ABSOLUTE_POSITION: Self = Self(1 << 7);
    /// Sent to the firmware ahead of queued codes.
    pub const IS_PRIORITIZED: Self = Self(1 << 8);
    /// Bypasses buffers; nothing else runs on the channel until it finishes.
    pub const UNBUFFERED: Self = Self(1 << 9);
    /// Requested by the firmware.
    pub const IS_FROM_FIRMWARE: Self = Self(1 << 10);
    /// Last code on its line.
    pub const IS_LAST_CODE: Self = Self(1 << 11);

    /// Builds a flag set from raw bits, keeping unknown bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw bitmask.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns true when no flag is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true when every flag in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets every flag in `other`.
    pub const fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clears every flag in `other`.
    pub const fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl BitOr for CodeFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for CodeFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.insert(rhs);
    }
}
