//! Accept loop for endpoint sockets.

use std::fmt;
use std::fs;
use std::io;
use std::os::unix::fs::FileTypeExt;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use dsf_types::{HttpEndpoint, HttpEndpointType, HttpResponseType};
use tracing::{debug, info, warn};

use super::{BRIDGE_TARGET, BridgeError, HttpEndpointConnection, HttpEndpointHandler};
use crate::shutdown::Closer;

const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);
const ERROR_BACKOFF: Duration = Duration::from_millis(150);
const NO_HANDLER_STATUS: u16 = 500;
const NO_HANDLER_MESSAGE: &str = "No event handler registered";

/// A bound endpoint socket that has not started accepting yet.
pub struct HttpEndpointSocket {
    endpoint: HttpEndpoint,
    path: PathBuf,
    listener: UnixListener,
    handler: Option<Arc<dyn HttpEndpointHandler>>,
}

impl fmt::Debug for HttpEndpointSocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpEndpointSocket")
            .field("endpoint", &self.endpoint)
            .field("has_handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}

impl HttpEndpointSocket {
    /// Binds the socket named by `endpoint.unix_socket`, replacing a stale
    /// socket file left by an earlier run.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InUse`] when another process is listening,
    /// [`BridgeError::NotSocket`] when the path is a regular file, and bind
    /// or cleanup errors otherwise.
    pub fn bind(endpoint: HttpEndpoint) -> Result<Self, BridgeError> {
        let path = PathBuf::from(&endpoint.unix_socket);
        let listener = bind_unix(&path)?;
        Ok(Self {
            endpoint,
            path,
            listener,
            handler: None,
        })
    }

    /// The endpoint served by this socket.
    #[must_use]
    pub const fn endpoint(&self) -> &HttpEndpoint {
        &self.endpoint
    }

    /// Path of the socket file.
    #[must_use]
    pub fn socket_path(&self) -> &Path {
        &self.path
    }

    /// Sets the handler for accepted connections. Without one every
    /// request is answered with status 500.
    #[must_use]
    pub fn with_handler<H>(mut self, handler: H) -> Self
    where
        H: HttpEndpointHandler,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Starts accepting on a background thread.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NonBlocking`] or [`BridgeError::Spawn`]; the
    /// socket file is removed in both cases.
    pub fn start(self) -> Result<BridgeHandle, BridgeError> {
        if let Err(source) = self.listener.set_nonblocking(true) {
            remove_socket_file(&self.path);
            return Err(BridgeError::NonBlocking { source });
        }
        let path = self.path.clone();
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);
        let spawned = thread::Builder::new()
            .name("dsf-endpoint".to_owned())
            .spawn(move || run_accept_loop(&self, &flag));
        match spawned {
            Ok(handle) => Ok(BridgeHandle {
                shutdown,
                handle: Some(handle),
            }),
            Err(source) => {
                remove_socket_file(&path);
                Err(BridgeError::Spawn { source })
            }
        }
    }
}

/// Handle to a running accept loop. Dropping it stops the loop.
#[derive(Debug)]
pub struct BridgeHandle {
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl BridgeHandle {
    /// Asks the accept loop to stop. Connections already handed to a
    /// handler are unaffected.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Returns a closer that stops the accept loop, for the shutdown
    /// coordinator.
    #[must_use]
    pub fn closer(&self) -> BridgeCloser {
        BridgeCloser {
            shutdown: Arc::clone(&self.shutdown),
        }
    }

    /// Waits for the accept loop to exit.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ThreadPanic`] if the loop panicked.
    pub fn join(mut self) -> Result<(), BridgeError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| BridgeError::ThreadPanic),
            None => Ok(()),
        }
    }
}

impl Drop for BridgeHandle {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

/// Stops an accept loop from any thread.
#[derive(Debug, Clone)]
pub struct BridgeCloser {
    shutdown: Arc<AtomicBool>,
}

impl Closer for BridgeCloser {
    fn close(&self) -> io::Result<()> {
        self.shutdown.store(true, Ordering::SeqCst);
        Ok(())
    }
}

fn run_accept_loop(socket: &HttpEndpointSocket, shutdown: &AtomicBool) {
    info!(
        target: BRIDGE_TARGET,
        uri = %socket.endpoint.uri(),
        path = %socket.path.display(),
        "endpoint socket active"
    );
    let endpoint = Arc::new(socket.endpoint.clone());
    let is_websocket = socket.endpoint.endpoint_type == HttpEndpointType::WebSocket;
    let mut last_error = None::<io::ErrorKind>;
    while !shutdown.load(Ordering::SeqCst) {
        match accept(&socket.listener) {
            Ok(Some(stream)) => {
                last_error = None;
                dispatch(stream, is_websocket, &endpoint, socket.handler.as_ref());
            }
            Ok(None) => thread::sleep(ACCEPT_BACKOFF),
            Err(error) => {
                let kind = error.kind();
                if last_error != Some(kind) {
                    warn!(target: BRIDGE_TARGET, error = %error, "endpoint accept error");
                }
                last_error = Some(kind);
                thread::sleep(ERROR_BACKOFF);
            }
        }
    }
    remove_socket_file(&socket.path);
    debug!(target: BRIDGE_TARGET, uri = %socket.endpoint.uri(), "endpoint socket stopped");
}

fn accept(listener: &UnixListener) -> io::Result<Option<UnixStream>> {
    match listener.accept() {
        Ok((stream, _)) => {
            stream.set_nonblocking(false)?;
            Ok(Some(stream))
        }
        Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(None),
        Err(error) => Err(error),
    }
}

fn dispatch(
    stream: UnixStream,
    is_websocket: bool,
    endpoint: &Arc<HttpEndpoint>,
    handler: Option<&Arc<dyn HttpEndpointHandler>>,
) {
    let mut connection = match HttpEndpointConnection::new(stream, is_websocket) {
        Ok(connection) => connection,
        Err(error) => {
            warn!(target: BRIDGE_TARGET, error = %error, "failed to prepare endpoint connection");
            return;
        }
    };
    let Some(handler) = handler else {
        if let Err(error) = connection.send_response(
            NO_HANDLER_STATUS,
            NO_HANDLER_MESSAGE,
            HttpResponseType::StatusCode,
        ) {
            warn!(target: BRIDGE_TARGET, error = %error, "failed to reject endpoint request");
        }
        if let Err(error) = connection.close() {
            debug!(target: BRIDGE_TARGET, error = %error, "failed to close endpoint connection");
        }
        return;
    };
    let shared_handler = Arc::clone(handler);
    let shared_endpoint = Arc::clone(endpoint);
    let spawned = thread::Builder::new()
        .name("dsf-endpoint-request".to_owned())
        .spawn(move || shared_handler.handle(&shared_endpoint, connection));
    if let Err(error) = spawned {
        warn!(target: BRIDGE_TARGET, error = %error, "failed to start endpoint handler");
    }
}

fn bind_unix(path: &Path) -> Result<UnixListener, BridgeError> {
    let display = || path.display().to_string();
    if path.exists() {
        let metadata = fs::symlink_metadata(path).map_err(|source| BridgeError::Metadata {
            path: display(),
            source,
        })?;
        if !metadata.file_type().is_socket() {
            return Err(BridgeError::NotSocket { path: display() });
        }
        match UnixStream::connect(path) {
            Ok(_live) => return Err(BridgeError::InUse { path: display() }),
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound
                ) =>
            {
                fs::remove_file(path).map_err(|source| BridgeError::Cleanup {
                    path: display(),
                    source,
                })?;
            }
            Err(source) => {
                return Err(BridgeError::Probe {
                    path: display(),
                    source,
                });
            }
        }
    }
    UnixListener::bind(path).map_err(|source| BridgeError::Bind {
        path: display(),
        source,
    })
}

fn remove_socket_file(path: &Path) {
    if let Err(error) = fs::remove_file(path)
        && error.kind() != io::ErrorKind::NotFound
    {
        warn!(
            target: BRIDGE_TARGET,
            error = %error,
            path = %path.display(),
            "failed to remove endpoint socket file"
        );
    }
}
