//! Command connections and the request helpers shared with interceptors.

use std::path::Path;

use dsf_types::{
    AccessLevel, Code, CodeChannel, CodeResult, HttpEndpoint, HttpEndpointType, LogLevel,
    MessageType, SessionType,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::Connection;
use crate::commands::{
    AddHttpEndpoint, AddUserSession, CheckPassword, Command, EvaluateExpression, Flush,
    GetFileInfo, GetObjectModel, InstallPlugin, LockObjectModel, PatchObjectModel,
    RemoveHttpEndpoint, RemoveUserSession, ResolvePath, SetObjectModel, SetPluginData,
    SetUpdateStatus, SimpleCode, StartPlugin, StartPlugins, StopPlugin, StopPlugins,
    SyncObjectModel, UninstallPlugin, UnlockObjectModel, WriteMessage,
};
use crate::error::ConnectionError;
use crate::http_endpoint::HttpEndpointSocket;
use crate::init::CommandInitMessage;

/// Request/response operations available on command and intercept
/// connections.
///
/// Each call is one blocking round trip; the connection must not be used
/// from two threads at once.
pub trait CommandSession {
    /// The underlying connection.
    fn connection(&mut self) -> &mut Connection;

    /// Sends any command and decodes its result.
    ///
    /// # Errors
    ///
    /// See [`Connection::perform_command`].
    fn perform_command<C>(&mut self, command: &C) -> Result<C::Output, ConnectionError>
    where
        C: Command + ?Sized,
    {
        self.connection().perform_command(command)
    }

    /// Executes a parsed code. The result is absent for asynchronous codes
    /// that were only queued.
    ///
    /// # Errors
    ///
    /// See [`Connection::perform_command`].
    fn perform_code(&mut self, code: &Code) -> Result<Option<CodeResult>, ConnectionError> {
        self.perform_command(code)
    }

    /// Executes code text on `channel` and returns the firmware output.
    ///
    /// # Errors
    ///
    /// See [`Connection::perform_command`].
    fn perform_simple_code(
        &mut self,
        code: &str,
        channel: CodeChannel,
    ) -> Result<String, ConnectionError> {
        self.perform_command(&SimpleCode::new(code, channel))
    }

    /// Waits for the codes queued on `channel`. Returns false when the
    /// wait was aborted.
    ///
    /// # Errors
    ///
    /// See [`Connection::perform_command`].
    fn flush(&mut self, channel: CodeChannel) -> Result<bool, ConnectionError> {
        self.perform_command(&Flush { channel })
            .map(|flushed| flushed.unwrap_or(true))
    }

    /// Evaluates a firmware expression in the context of `channel`.
    ///
    /// # Errors
    ///
    /// See [`Connection::perform_command`].
    fn evaluate_expression<T>(
        &mut self,
        channel: CodeChannel,
        expression: &str,
    ) -> Result<T, ConnectionError>
    where
        T: DeserializeOwned,
    {
        self.perform_command(&EvaluateExpression::<T>::new(channel, expression))
    }

    /// Fetches the object model decoded as `T`, such as `serde_json::Value`
    /// or a caller-defined partial model.
    ///
    /// # Errors
    ///
    /// See [`Connection::perform_command`].
    fn get_object_model<T>(&mut self) -> Result<T, ConnectionError>
    where
        T: DeserializeOwned,
    {
        self.perform_command(&GetObjectModel::<T>::default())
    }

    /// Fetches the object model as raw JSON.
    ///
    /// # Errors
    ///
    /// See [`Connection::perform_command`].
    fn get_serialized_object_model(&mut self) -> Result<Value, ConnectionError> {
        self.get_object_model::<Value>()
    }

    /// Waits until the object model matches the firmware.
    ///
    /// # Errors
    ///
    /// See [`Connection::perform_command`].
    fn sync_object_model(&mut self) -> Result<(), ConnectionError> {
        self.perform_command(&SyncObjectModel).map(drop)
    }

    /// Takes the object model write lock.
    ///
    /// # Errors
    ///
    /// See [`Connection::perform_command`].
    fn lock_object_model(&mut self) -> Result<(), ConnectionError> {
        self.perform_command(&LockObjectModel).map(drop)
    }

    /// Releases the object model write lock.
    ///
    /// # Errors
    ///
    /// See [`Connection::perform_command`].
    fn unlock_object_model(&mut self) -> Result<(), ConnectionError> {
        self.perform_command(&UnlockObjectModel).map(drop)
    }

    /// Sets one property of the locked object model.
    ///
    /// # Errors
    ///
    /// See [`Connection::perform_command`].
    fn set_object_model(
        &mut self,
        property_path: &str,
        value: &str,
    ) -> Result<bool, ConnectionError> {
        self.perform_command(&SetObjectModel {
            property_path: property_path.to_owned(),
            value: value.to_owned(),
        })
        .map(|applied| applied.unwrap_or(true))
    }

    /// Applies a JSON patch to the object model key `key`.
    ///
    /// # Errors
    ///
    /// See [`Connection::perform_command`].
    fn patch_object_model(&mut self, key: &str, patch: &str) -> Result<(), ConnectionError> {
        self.perform_command(&PatchObjectModel {
            key: key.to_owned(),
            patch: patch.to_owned(),
        })
        .map(drop)
    }

    /// Maps a firmware path such as `0:/sys/config.g` to a host path.
    ///
    /// # Errors
    ///
    /// See [`Connection::perform_command`].
    fn resolve_path(&mut self, path: &str) -> Result<String, ConnectionError> {
        self.perform_command(&ResolvePath {
            path: path.to_owned(),
        })
    }

    /// Parses a G-code file and decodes its metadata as `T`.
    ///
    /// # Errors
    ///
    /// See [`Connection::perform_command`].
    fn get_file_info<T>(&mut self, file_name: &str) -> Result<T, ConnectionError>
    where
        T: DeserializeOwned,
    {
        self.perform_command(&GetFileInfo::<T>::new(file_name))
    }

    /// Installs or upgrades a plugin bundle.
    ///
    /// # Errors
    ///
    /// See [`Connection::perform_command`].
    fn install_plugin(&mut self, plugin_file: &str) -> Result<(), ConnectionError> {
        self.perform_command(&InstallPlugin {
            plugin_file: plugin_file.to_owned(),
        })
        .map(drop)
    }

    /// Starts a plugin.
    ///
    /// # Errors
    ///
    /// See [`Connection::perform_command`].
    fn start_plugin(&mut self, plugin: &str) -> Result<(), ConnectionError> {
        self.perform_command(&StartPlugin {
            plugin: plugin.to_owned(),
        })
        .map(drop)
    }

    /// Stops a plugin.
    ///
    /// # Errors
    ///
    /// See [`Connection::perform_command`].
    fn stop_plugin(&mut self, plugin: &str) -> Result<(), ConnectionError> {
        self.perform_command(&StopPlugin {
            plugin: plugin.to_owned(),
        })
        .map(drop)
    }

    /// Uninstalls a plugin.
    ///
    /// # Errors
    ///
    /// See [`Connection::perform_command`].
    fn uninstall_plugin(&mut self, plugin: &str) -> Result<(), ConnectionError> {
        self.perform_command(&UninstallPlugin {
            plugin: plugin.to_owned(),
        })
        .map(drop)
    }

    /// Stores custom data for a plugin; an empty `plugin` targets the
    /// calling plugin.
    ///
    /// # Errors
    ///
    /// See [`Connection::perform_command`].
    fn set_plugin_data(
        &mut self,
        plugin: &str,
        key: &str,
        value: &str,
    ) -> Result<(), ConnectionError> {
        self.perform_command(&SetPluginData {
            plugin: plugin.to_owned(),
            key: key.to_owned(),
            value: value.to_owned(),
        })
        .map(drop)
    }

    /// Starts the plugins that were running before the last shutdown.
    ///
    /// # Errors
    ///
    /// See [`Connection::perform_command`].
    fn start_plugins(&mut self) -> Result<(), ConnectionError> {
        self.perform_command(&StartPlugins).map(drop)
    }

    /// Stops all plugins.
    ///
    /// # Errors
    ///
    /// See [`Connection::perform_command`].
    fn stop_plugins(&mut self) -> Result<(), ConnectionError> {
        self.perform_command(&StopPlugins).map(drop)
    }

    /// Registers a user session and returns its id. An `origin_id` of `-1`
    /// is replaced by the current process id.
    ///
    /// # Errors
    ///
    /// See [`Connection::perform_command`].
    fn add_user_session(
        &mut self,
        access_level: AccessLevel,
        session_type: SessionType,
        origin: &str,
        origin_id: i64,
    ) -> Result<i64, ConnectionError> {
        self.perform_command(&AddUserSession::new(
            access_level,
            session_type,
            origin,
            origin_id,
        ))
    }

    /// Removes a user session.
    ///
    /// # Errors
    ///
    /// See [`Connection::perform_command`].
    fn remove_user_session(&mut self, id: i64) -> Result<bool, ConnectionError> {
        self.perform_command(&RemoveUserSession { id })
            .map(|removed| removed.unwrap_or(true))
    }

    /// Writes a message to the console, and to the log when `log_level`
    /// is given.
    ///
    /// # Errors
    ///
    /// See [`Connection::perform_command`].
    fn write_message(
        &mut self,
        message_type: MessageType,
        content: &str,
        log_level: Option<LogLevel>,
    ) -> Result<(), ConnectionError> {
        self.perform_command(&WriteMessage::new(message_type, content, log_level))
            .map(drop)
    }

    /// Overrides the machine status during a software update.
    ///
    /// # Errors
    ///
    /// See [`Connection::perform_command`].
    fn set_update_status(&mut self, updating: bool) -> Result<(), ConnectionError> {
        self.perform_command(&SetUpdateStatus { updating }).map(drop)
    }

    /// Checks a password as `M551` would.
    ///
    /// # Errors
    ///
    /// See [`Connection::perform_command`].
    fn check_password(&mut self, password: &str) -> Result<bool, ConnectionError> {
        self.perform_command(&CheckPassword {
            password: password.to_owned(),
        })
        .map(|valid| valid.unwrap_or(true))
    }

    /// Registers an HTTP endpoint and binds the socket the server forwards
    /// its requests to. Start the returned socket to serve requests.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Connection::perform_command`] and
    /// [`ConnectionError::Endpoint`] when the socket cannot be bound.
    fn add_http_endpoint(
        &mut self,
        endpoint_type: HttpEndpointType,
        namespace: &str,
        path: &str,
        is_upload_request: bool,
    ) -> Result<HttpEndpointSocket, ConnectionError> {
        let unix_socket = self.perform_command(&AddHttpEndpoint {
            endpoint_type,
            namespace: namespace.to_owned(),
            path: path.to_owned(),
            is_upload_request,
        })?;
        let endpoint = HttpEndpoint {
            endpoint_type,
            namespace: namespace.to_owned(),
            path: path.to_owned(),
            is_upload_request,
            unix_socket,
        };
        HttpEndpointSocket::bind(endpoint).map_err(ConnectionError::Endpoint)
    }

    /// Unregisters an HTTP endpoint.
    ///
    /// # Errors
    ///
    /// See [`Connection::perform_command`].
    fn remove_http_endpoint(
        &mut self,
        endpoint_type: HttpEndpointType,
        namespace: &str,
        path: &str,
    ) -> Result<bool, ConnectionError> {
        self.perform_command(&RemoveHttpEndpoint {
            endpoint_type,
            namespace: namespace.to_owned(),
            path: path.to_owned(),
        })
        .map(|removed| removed.unwrap_or(true))
    }
}

/// A connection in command mode.
#[derive(Debug)]
pub struct CommandConnection {
    connection: Connection,
}

impl CommandConnection {
    /// Connects to the control server socket at `path`.
    ///
    /// # Errors
    ///
    /// See [`Connection::open`].
    pub fn connect(path: &Path) -> Result<Self, ConnectionError> {
        Connection::open(path, &CommandInitMessage::default()).map(|connection| Self { connection })
    }

    /// The underlying connection.
    #[must_use]
    pub const fn inner(&self) -> &Connection {
        &self.connection
    }
}

impl CommandSession for CommandConnection {
    fn connection(&mut self) -> &mut Connection {
        &mut self.connection
    }
}
