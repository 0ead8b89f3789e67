//! User sessions and third-party plugin permissions.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use strum::{Display, EnumString};
use thiserror::Error;

/// What a user session may do.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum AccessLevel {
    /// Changes to the system or its operation are rejected.
    ReadOnly,
    /// Changes are permitted.
    #[default]
    ReadWrite,
}

/// Where a user session comes from.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionType {
    /// Local client.
    #[default]
    Local,
    /// Remote HTTP client.
    Http,
    /// Remote Telnet client.
    Telnet,
}

/// A user session as listed in the object model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    /// Session identifier.
    pub id: i64,
    /// Permitted access.
    pub access_level: AccessLevel,
    /// Kind of client.
    pub session_type: SessionType,
    /// Remote address, or empty for local sessions.
    pub origin: String,
    /// Remote port, or the process id of a local client.
    pub origin_id: i64,
}

/// A permission name was not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown SBC permission '{name}'")]
pub struct UnknownPermission {
    name: String,
}

/// Permissions requested by a plugin; comma-separated names on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SbcPermissions(u32);

macro_rules! permissions {
    ($($(#[$doc:meta])* $name:ident = $bit:expr, $wire:literal;)+) => {
        impl SbcPermissions {
            $(
                $(#[$doc])*
                pub const $name: Self = Self(1 << $bit);
            )+

            const NAMED: &'static [(Self, &'static str)] = &[$((Self::$name, $wire)),+];
        }
    };
}

permissions! {
    /// Run codes and read the object model.
    COMMAND_EXECUTION = 0, "commandExecution";
    /// Intercept codes without changing them.
    CODE_INTERCEPTION_READ = 1, "codeInterceptionRead";
    /// Intercept and rewrite codes.
    CODE_INTERCEPTION_READ_WRITE = 2, "codeInterceptionReadWrite";
    /// Install, start and stop other plugins.
    MANAGE_PLUGINS = 3, "managePlugins";
    /// Add and remove user sessions.
    MANAGE_USER_SESSIONS = 4, "manageUserSessions";
    /// Read the object model.
    OBJECT_MODEL_READ = 5, "objectModelRead";
    /// Read and modify the object model.
    OBJECT_MODEL_READ_WRITE = 6, "objectModelReadWrite";
    /// Register custom HTTP endpoints.
    REGISTER_HTTP_ENDPOINTS = 7, "registerHttpEndpoints";
    /// Read from the filaments directory.
    READ_FILAMENTS = 8, "readFilaments";
    /// Write to the filaments directory.
    WRITE_FILAMENTS = 9, "writeFilaments";
    /// Read from the firmware directory.
    READ_FIRMWARE = 10, "readFirmware";
    /// Write to the firmware directory.
    WRITE_FIRMWARE = 11, "writeFirmware";
    /// Read from the G-code directory.
    READ_GCODES = 12, "readGCodes";
    /// Write to the G-code directory.
    WRITE_GCODES = 13, "writeGCodes";
    /// Read from the macros directory.
    READ_MACROS = 14, "readMacros";
    /// Write to the macros directory.
    WRITE_MACROS = 15, "writeMacros";
    /// Read from the menu directory.
    READ_MENU = 16, "readMenu";
    /// Write to the menu directory.
    WRITE_MENU = 17, "writeMenu";
    /// Read from the system directory.
    READ_SYSTEM = 18, "readSystem";
    /// Write to the system directory.
    WRITE_SYSTEM = 19, "writeSystem";
    /// Read from the web directory.
    READ_WEB = 20, "readWeb";
    /// Write to the web directory.
    WRITE_WEB = 21, "writeWeb";
    /// Access files outside the virtual SD directories.
    FILE_SYSTEM_ACCESS = 22, "fileSystemAccess";
    /// Launch new processes.
    LAUNCH_PROCESS = 23, "launchProcess";
    /// Open network sockets.
    NETWORK_ACCESS = 24, "networkAccess";
    /// Run as root.
    SUPER_USER = 25, "superUser";
}

impl SbcPermissions {
    /// No permissions.
    pub const NONE: Self = Self(0);

    /// Returns the raw bitmask.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns true when no permission is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true when every permission in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets every permission in `other`.
    pub const fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clears every permission in `other`.
    pub const fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Iterates over the wire names of the set permissions.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMED
            .iter()
            .filter(move |(permission, _)| self.contains(*permission))
            .map(|(_, name)| *name)
    }

    fn from_name(name: &str) -> Result<Self, UnknownPermission> {
        if name.eq_ignore_ascii_case("none") {
            return Ok(Self::NONE);
        }
        Self::NAMED
            .iter()
            .find(|(_, known)| known.eq_ignore_ascii_case(name))
            .map(|(permission, _)| *permission)
            .ok_or_else(|| UnknownPermission {
                name: name.to_owned(),
            })
    }
}

impl BitOr for SbcPermissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for SbcPermissions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.insert(rhs);
    }
}

impl fmt::Display for SbcPermissions {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return formatter.write_str("none");
        }
        formatter.write_str(&self.names().collect::<Vec<_>>().join(", "))
    }
}

impl FromStr for SbcPermissions {
    type Err = UnknownPermission;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        text.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .try_fold(Self::NONE, |set, name| Ok(set | Self::from_name(name)?))
    }
}

impl Serialize for SbcPermissions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SbcPermissions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PermissionsVisitor)
    }
}

struct PermissionsVisitor;

impl<'de> Visitor<'de> for PermissionsVisitor {
    type Value = SbcPermissions;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a comma-separated permission list or an array of names")
    }

    fn visit_str<E: de::Error>(self, text: &str) -> Result<Self::Value, E> {
        text.parse().map_err(E::custom)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut set = SbcPermissions::NONE;
        while let Some(name) = seq.next_element::<String>()? {
            set |= SbcPermissions::from_name(&name).map_err(de::Error::custom)?;
        }
        Ok(set)
    }
}
