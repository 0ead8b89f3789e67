//! Typed requests understood by the control server.
//!
//! Every request travels as one JSON object whose `command` field names it;
//! the remaining fields are the request's own, in camelCase. Requests that
//! expect a reply implement [`Command`], whose associated `Output` is the
//! type of the `result` field of a successful [`Response`].

mod codes;
mod endpoints;
mod object_model;
mod plugins;
mod replies;
mod system;

use std::any::type_name;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CommandError, ConnectionError};

pub use self::codes::{CheckPassword, EvaluateExpression, Flush, SimpleCode};
pub use self::endpoints::{
    AddHttpEndpoint, AddUserSession, RemoveHttpEndpoint, RemoveUserSession,
};
pub use self::object_model::{
    GetFileInfo, GetObjectModel, LockObjectModel, PatchObjectModel, ResolvePath, SetObjectModel,
    SyncObjectModel, UnlockObjectModel,
};
pub use self::plugins::{
    InstallPlugin, SetPluginData, StartPlugin, StartPlugins, StopPlugin, StopPlugins,
    UninstallPlugin,
};
pub use self::replies::{Acknowledge, Cancel, Ignore, Resolve};
pub use self::system::{SetUpdateStatus, WriteMessage};

/// A message sent to the control server.
pub trait Request: Serialize {
    /// Value of the `command` field.
    const NAME: &'static str;
}

/// A request answered by a [`Response`].
pub trait Command: Request {
    /// Decoded `result` of a successful response.
    type Output: DeserializeOwned;
}

/// Reply to a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response<T> {
    /// Whether the command succeeded.
    pub success: bool,
    /// Command result; may be present even on failure.
    #[serde(default)]
    pub result: Option<T>,
    /// Server exception type on failure.
    #[serde(default)]
    pub error_type: Option<String>,
    /// Server exception message on failure.
    #[serde(default)]
    pub error_message: Option<String>,
}

impl Response<Value> {
    /// Converts the response of `C` into its typed result.
    pub(crate) fn into_output<C>(self) -> Result<C::Output, ConnectionError>
    where
        C: Command + ?Sized,
    {
        if !self.success {
            return Err(CommandError::new(C::NAME, self).into());
        }
        serde_json::from_value(self.result.unwrap_or(Value::Null)).map_err(|source| {
            ConnectionError::Decode {
                target: type_name::<C::Output>(),
                source,
            }
        })
    }
}

/// Builds the wire object for `request`: `command` first, then its fields.
///
/// # Errors
///
/// Returns [`ConnectionError::Encode`] when the request does not serialise
/// to a JSON object.
pub fn envelope<R>(request: &R) -> Result<Value, ConnectionError>
where
    R: Request + ?Sized,
{
    let encode = |source| ConnectionError::Encode {
        target: type_name::<R>(),
        source,
    };
    let fields = serde_json::to_value(request).map_err(encode)?;
    let mut message = Map::new();
    message.insert("command".to_owned(), Value::from(R::NAME));
    match fields {
        Value::Object(map) => message.extend(map),
        Value::Null => {}
        _ => {
            return Err(encode(serde::ser::Error::custom(
                "requests must serialise to JSON objects",
            )));
        }
    }
    Ok(Value::Object(message))
}

/// Implements [`Request`] and [`Command`] for a request type named after
/// its `command` value.
macro_rules! command {
    ($name:ident => $output:ty) => {
        impl $crate::commands::Request for $name {
            const NAME: &'static str = stringify!($name);
        }

        impl $crate::commands::Command for $name {
            type Output = $output;
        }
    };
}

pub(crate) use command;

#[cfg(test)]
mod tests;
