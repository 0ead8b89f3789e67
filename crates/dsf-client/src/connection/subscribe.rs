//! Subscriptions to object model updates.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::Connection;
use crate::commands::Acknowledge;
use crate::error::ConnectionError;
use crate::init::{SubscribeInitMessage, SubscriptionMode};

/// What a subscriber wants to receive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscribeOptions {
    /// Full models or patches.
    pub mode: SubscriptionMode,
    /// Object model paths such as `heat/**`; empty means everything.
    pub filters: Vec<String>,
}

/// A connection in subscribe mode.
///
/// The server sends the full model first and then, in patch mode, only the
/// changed parts. Every update must be acknowledged before the next one is
/// sent; the receive methods do this.
#[derive(Debug)]
pub struct SubscribeConnection {
    connection: Connection,
    options: SubscribeOptions,
}

impl SubscribeConnection {
    /// Connects to the socket at `path` and subscribes.
    ///
    /// # Errors
    ///
    /// See [`Connection::open`].
    pub fn connect(path: &Path, options: SubscribeOptions) -> Result<Self, ConnectionError> {
        let init = SubscribeInitMessage::new(options.mode, &options.filters);
        let connection = Connection::open(path, &init)?;
        Ok(Self {
            connection,
            options,
        })
    }

    /// The underlying connection.
    #[must_use]
    pub const fn inner(&self) -> &Connection {
        &self.connection
    }

    /// Options the connection was opened with.
    #[must_use]
    pub const fn options(&self) -> &SubscribeOptions {
        &self.options
    }

    /// Receives the next update decoded as `T` and acknowledges it. Returns
    /// `None` when the server closed the connection.
    ///
    /// # Errors
    ///
    /// Returns transport and decode errors. A decode error leaves the
    /// update unacknowledged.
    pub fn receive_object_model<T>(&mut self) -> Result<Option<T>, ConnectionError>
    where
        T: DeserializeOwned,
    {
        let Some(update) = self.connection.receive::<T>()? else {
            return Ok(None);
        };
        self.connection.send(&Acknowledge)?;
        Ok(Some(update))
    }

    /// Receives the next update as raw JSON and acknowledges it.
    ///
    /// # Errors
    ///
    /// See [`SubscribeConnection::receive_object_model`].
    pub fn receive_patch(&mut self) -> Result<Option<Value>, ConnectionError> {
        self.receive_object_model::<Value>()
    }
}
