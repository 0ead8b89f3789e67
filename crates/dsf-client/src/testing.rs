//! A scripted control server for tests.
//!
//! [`FakeServer`] listens on a socket in a temporary directory, accepts one
//! client and plays a script of [`Step`]s: sending prepared JSON values and
//! recording whatever the client sends. When the script ends the server
//! closes the connection, so a client reading past the script sees a clean
//! end of stream.

use std::io::{BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow, bail};
use serde_json::{Value, json};
use tempfile::TempDir;

const ACCEPT_DEADLINE: Duration = Duration::from_secs(2);
const READ_TIMEOUT: Duration = Duration::from_secs(2);

/// One step of a server script.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Send a value to the client.
    Send(Value),
    /// Read one value from the client and record it.
    Receive,
}

/// Greeting advertising `version` and connection `id`.
#[must_use]
pub fn handshake(version: i64, id: i64) -> Value {
    json!({ "version": version, "id": id })
}

/// Successful response carrying `result`.
#[must_use]
pub fn success(result: Value) -> Value {
    json!({ "success": true, "result": result })
}

/// Failed response with the given error type and message.
#[must_use]
pub fn failure(error_type: &str, error_message: &str) -> Value {
    json!({ "success": false, "errorType": error_type, "errorMessage": error_message })
}

/// The steps of a successful handshake: greet, read the init message,
/// acknowledge it.
#[must_use]
pub fn accepting_handshake(version: i64, id: i64) -> Vec<Step> {
    vec![
        Step::Send(handshake(version, id)),
        Step::Receive,
        Step::Send(success(Value::Null)),
    ]
}

/// A control server stand-in running a fixed script on its own thread.
#[derive(Debug)]
pub struct FakeServer {
    _dir: TempDir,
    path: PathBuf,
    handle: JoinHandle<Result<Vec<Value>>>,
}

impl FakeServer {
    /// Binds a fresh socket and starts playing `script` for the first
    /// client.
    ///
    /// # Errors
    ///
    /// Returns an error when the socket cannot be bound.
    pub fn start(script: Vec<Step>) -> Result<Self> {
        let dir = tempfile::tempdir().context("create socket directory")?;
        let path = dir.path().join("dcs.sock");
        let listener = UnixListener::bind(&path).context("bind fake server")?;
        listener
            .set_nonblocking(true)
            .context("make fake server non-blocking")?;
        let handle = thread::spawn(move || serve(&listener, script));
        Ok(Self {
            _dir: dir,
            path,
            handle,
        })
    }

    /// Path of the listening socket.
    #[must_use]
    pub fn socket_path(&self) -> &Path {
        &self.path
    }

    /// Waits for the script to finish and returns the recorded client
    /// messages in order.
    ///
    /// # Errors
    ///
    /// Returns an error when no client connected, a read timed out or the
    /// client closed the stream before the script expected it.
    pub fn finish(self) -> Result<Vec<Value>> {
        self.handle
            .join()
            .map_err(|_| anyhow!("fake server thread panicked"))?
    }
}

fn serve(listener: &UnixListener, script: Vec<Step>) -> Result<Vec<Value>> {
    let stream = accept(listener)?;
    stream
        .set_read_timeout(Some(READ_TIMEOUT))
        .context("set read timeout")?;
    let mut writer = stream.try_clone().context("clone stream")?;
    let mut reader = BufReader::new(stream);
    let mut received = Vec::new();
    for step in script {
        match step {
            Step::Send(value) => {
                writer
                    .write_all(value.to_string().as_bytes())
                    .context("write scripted message")?;
            }
            Step::Receive => {
                let value = serde_json::Deserializer::from_reader(&mut reader)
                    .into_iter::<Value>()
                    .next()
                    .ok_or_else(|| anyhow!("client closed the stream early"))?
                    .context("read client message")?;
                received.push(value);
            }
        }
    }
    Ok(received)
}

fn accept(listener: &UnixListener) -> Result<UnixStream> {
    let deadline = Instant::now() + ACCEPT_DEADLINE;
    loop {
        match listener.accept() {
            Ok((stream, _)) => {
                stream
                    .set_nonblocking(false)
                    .context("make client stream blocking")?;
                return Ok(stream);
            }
            Err(error) if error.kind() == std::io::ErrorKind::WouldBlock => {
                if Instant::now() >= deadline {
                    bail!("no client connected to the fake server");
                }
                thread::sleep(Duration::from_millis(10));
            }
            Err(error) => return Err(error).context("accept client"),
        }
    }
}
