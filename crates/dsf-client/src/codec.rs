//! Framing of JSON values over a Unix stream socket.
//!
//! The control server does not delimit messages: each message is one
//! complete JSON value and values follow each other directly on the stream.
//! Reads therefore run a streaming deserialiser over a buffered reader,
//! which consumes exactly one value and keeps any trailing bytes buffered
//! for the next call.

use std::any::type_name;
use std::io::{self, BufReader, Write};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::ConnectionError;
use crate::shutdown::Closer;

const WIRE_TARGET: &str = "dsf_client::wire";

/// A bidirectional JSON value stream.
#[derive(Debug)]
pub struct JsonStream {
    reader: BufReader<UnixStream>,
    writer: UnixStream,
}

impl JsonStream {
    /// Dials the Unix socket at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Connect`] when the socket cannot be opened.
    pub fn connect(path: &Path) -> Result<Self, ConnectionError> {
        let stream = UnixStream::connect(path).map_err(|source| ConnectionError::Connect {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_stream(stream)
    }

    /// Wraps an already connected stream.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Receive`] when the stream cannot be cloned
    /// into separate read and write halves.
    pub fn from_stream(stream: UnixStream) -> Result<Self, ConnectionError> {
        let writer = stream
            .try_clone()
            .map_err(|source| ConnectionError::Receive { source })?;
        Ok(Self {
            reader: BufReader::new(stream),
            writer,
        })
    }

    /// Serialises `value` and writes it as a single message.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Encode`] when `value` cannot be serialised
    /// and [`ConnectionError::Send`] when the write fails.
    pub fn send<T>(&mut self, value: &T) -> Result<(), ConnectionError>
    where
        T: Serialize + ?Sized,
    {
        let payload = serde_json::to_vec(value).map_err(|source| ConnectionError::Encode {
            target: type_name::<T>(),
            source,
        })?;
        debug!(
            target: WIRE_TARGET,
            payload = %String::from_utf8_lossy(&payload),
            "sending message"
        );
        self.writer
            .write_all(&payload)
            .and_then(|()| self.writer.flush())
            .map_err(|source| ConnectionError::Send { source })
    }

    /// Reads the next value and decodes it as `T`.
    ///
    /// Returns `Ok(None)` when the peer closed the stream between values.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Receive`] on IO failures, including a
    /// stream that ends part-way through a value, and
    /// [`ConnectionError::Decode`] when the value is malformed or does not
    /// match `T`.
    pub fn receive<T>(&mut self) -> Result<Option<T>, ConnectionError>
    where
        T: DeserializeOwned,
    {
        let target = type_name::<T>();
        let Some(value) = self.read_value(target)? else {
            return Ok(None);
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|source| ConnectionError::Decode { target, source })
    }

    fn read_value(&mut self, target: &'static str) -> Result<Option<Value>, ConnectionError> {
        let next = serde_json::Deserializer::from_reader(&mut self.reader)
            .into_iter::<Value>()
            .next();
        match next {
            None => Ok(None),
            Some(Ok(value)) => {
                debug!(target: WIRE_TARGET, payload = %value, "received message");
                Ok(Some(value))
            }
            Some(Err(error)) if error.is_io() || error.is_eof() => Err(ConnectionError::Receive {
                source: io::Error::from(error),
            }),
            Some(Err(source)) => Err(ConnectionError::Decode { target, source }),
        }
    }

    /// Returns a handle that shuts the socket down from another thread.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Receive`] when the socket cannot be cloned.
    pub fn closer(&self) -> Result<SocketCloser, ConnectionError> {
        self.writer
            .try_clone()
            .map(|stream| SocketCloser { stream })
            .map_err(|source| ConnectionError::Receive { source })
    }

    /// Shuts both directions of the socket down.
    ///
    /// # Errors
    ///
    /// Returns the IO error reported by the socket, except for an already
    /// disconnected peer.
    pub fn close(&self) -> io::Result<()> {
        shutdown_socket(&self.writer)
    }
}

/// Shuts a socket down, unblocking any thread reading from it.
#[derive(Debug)]
pub struct SocketCloser {
    stream: UnixStream,
}

impl Closer for SocketCloser {
    fn close(&self) -> io::Result<()> {
        shutdown_socket(&self.stream)
    }
}

fn shutdown_socket(stream: &UnixStream) -> io::Result<()> {
    match stream.shutdown(Shutdown::Both) {
        Err(error) if error.kind() != io::ErrorKind::NotConnected => Err(error),
        _ => Ok(()),
    }
}
