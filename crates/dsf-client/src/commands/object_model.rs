//! Object model and file system requests.

use std::marker::PhantomData;

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use serde_json::Value;

use super::{Command, Request, command};

/// Fetches the full object model, decoded as `T`.
#[derive(Debug, Serialize)]
#[serde(bound = "")]
pub struct GetObjectModel<T = Value> {
    #[serde(skip)]
    output: PhantomData<fn() -> T>,
}

impl<T> Default for GetObjectModel<T> {
    fn default() -> Self {
        Self {
            output: PhantomData,
        }
    }
}

impl<T> Request for GetObjectModel<T> {
    const NAME: &'static str = "GetObjectModel";
}

impl<T: DeserializeOwned> Command for GetObjectModel<T> {
    type Output = T;
}

/// Waits until the object model is in sync with the firmware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncObjectModel;

command!(SyncObjectModel => IgnoredAny);

/// Takes the object model write lock. It must be released with
/// [`UnlockObjectModel`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LockObjectModel;

command!(LockObjectModel => IgnoredAny);

/// Releases the object model write lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UnlockObjectModel;

command!(UnlockObjectModel => IgnoredAny);

/// Sets one property of a locked object model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetObjectModel {
    /// Path such as `state.status`.
    pub property_path: String,
    /// New value in text form.
    pub value: String,
}

command!(SetObjectModel => Option<bool>);

/// Applies a JSON patch to one object model key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchObjectModel {
    /// Top-level key to patch.
    pub key: String,
    /// Patch document as JSON text.
    pub patch: String,
}

command!(PatchObjectModel => IgnoredAny);

/// Parses a G-code file and returns its metadata, decoded as `T`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase", bound = "")]
pub struct GetFileInfo<T = Value> {
    /// Firmware-style file name such as `0:/gcodes/part.gcode`.
    pub file_name: String,
    #[serde(skip)]
    output: PhantomData<fn() -> T>,
}

impl<T> GetFileInfo<T> {
    /// Builds the request.
    #[must_use]
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            output: PhantomData,
        }
    }
}

impl<T> Request for GetFileInfo<T> {
    const NAME: &'static str = "GetFileInfo";
}

impl<T: DeserializeOwned> Command for GetFileInfo<T> {
    type Output = T;
}

/// Maps a firmware-style path to a path on the host file system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvePath {
    /// Firmware-style path.
    pub path: String,
}

command!(ResolvePath => String);
