//! Intercepting connections.
//!
//! The server forwards each matching code and then blocks that code's
//! channel until the interceptor answers with exactly one of Cancel, Ignore
//! or Resolve. The connection tracks whether such an answer is owed and
//! refuses to read another code until it has been sent. Other commands may
//! be sent in between, for example a flush before resolving.

use std::path::Path;

use dsf_types::{Code, CodeChannel, Message, MessageType};
use tracing::debug;

use super::{CONNECTION_TARGET, Connection};
use crate::commands::{Cancel, Ignore, Request, Resolve};
use crate::connection::CommandSession;
use crate::error::ConnectionError;
use crate::init::{InterceptInitMessage, InterceptionMode};

/// What an interceptor wants to see.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterceptOptions {
    /// Pipeline stage to hook into.
    pub mode: InterceptionMode,
    /// Channels to intercept; empty means every channel.
    pub channels: Vec<CodeChannel>,
    /// Code filters such as `M98` or `G*`; empty means every code.
    pub filters: Vec<String>,
    /// Whether codes sent with priority are intercepted too.
    pub priority_codes: bool,
}

impl InterceptOptions {
    /// Options for `mode` with no further restrictions.
    #[must_use]
    pub const fn new(mode: InterceptionMode) -> Self {
        Self {
            mode,
            channels: Vec::new(),
            filters: Vec::new(),
            priority_codes: false,
        }
    }

    fn init_message(&self) -> InterceptInitMessage {
        InterceptInitMessage::new(
            self.mode,
            &self.channels,
            &self.filters,
            self.priority_codes,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum InterceptState {
    WaitingForCode,
    MustRespond { code: String },
}

/// A connection in intercept mode.
#[derive(Debug)]
pub struct InterceptConnection {
    connection: Connection,
    options: InterceptOptions,
    state: InterceptState,
}

impl InterceptConnection {
    /// Connects to the socket at `path` and registers as an interceptor.
    ///
    /// # Errors
    ///
    /// See [`Connection::open`].
    pub fn connect(path: &Path, options: InterceptOptions) -> Result<Self, ConnectionError> {
        let connection = Connection::open(path, &options.init_message())?;
        Ok(Self {
            connection,
            options,
            state: InterceptState::WaitingForCode,
        })
    }

    /// The underlying connection.
    #[must_use]
    pub const fn inner(&self) -> &Connection {
        &self.connection
    }

    /// Options the connection was opened with.
    #[must_use]
    pub const fn options(&self) -> &InterceptOptions {
        &self.options
    }

    /// Text of the intercepted code still awaiting an answer, if any.
    #[must_use]
    pub fn pending_code(&self) -> Option<&str> {
        match &self.state {
            InterceptState::WaitingForCode => None,
            InterceptState::MustRespond { code } => Some(code),
        }
    }

    /// Blocks until the server forwards a code. Returns `None` when the
    /// server closed the connection.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::ResolutionPending`] without reading when
    /// the previous code has not been answered, plus transport and decode
    /// errors.
    pub fn receive_code(&mut self) -> Result<Option<Code>, ConnectionError> {
        if let InterceptState::MustRespond { code } = &self.state {
            return Err(ConnectionError::ResolutionPending { code: code.clone() });
        }
        let received: Option<Code> = self.connection.receive()?;
        if let Some(code) = &received {
            let text = code.to_string();
            debug!(target: CONNECTION_TARGET, code = %text, "intercepted code");
            self.state = InterceptState::MustRespond { code: text };
        }
        Ok(received)
    }

    /// Cancels the intercepted code.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::NoPendingCode`] when no code awaits an
    /// answer, plus transport errors.
    pub fn cancel_code(&mut self) -> Result<(), ConnectionError> {
        self.respond(&Cancel)
    }

    /// Lets the intercepted code run unchanged.
    ///
    /// # Errors
    ///
    /// See [`InterceptConnection::cancel_code`].
    pub fn ignore_code(&mut self) -> Result<(), ConnectionError> {
        self.respond(&Ignore)
    }

    /// Completes the intercepted code with a message instead of running it.
    ///
    /// # Errors
    ///
    /// See [`InterceptConnection::cancel_code`].
    pub fn resolve_code(
        &mut self,
        message_type: MessageType,
        content: &str,
    ) -> Result<(), ConnectionError> {
        self.respond(&Resolve::new(message_type, content))
    }

    /// Completes the intercepted code with an existing message.
    ///
    /// # Errors
    ///
    /// See [`InterceptConnection::cancel_code`].
    pub fn resolve_code_message(&mut self, message: &Message) -> Result<(), ConnectionError> {
        self.respond(&Resolve::from(message))
    }

    /// Waits for the codes queued on the channel of the intercepted code.
    ///
    /// # Errors
    ///
    /// See [`Connection::perform_command`].
    pub fn flush(&mut self) -> Result<bool, ConnectionError> {
        CommandSession::flush(self, CodeChannel::Unknown)
    }

    fn respond<R>(&mut self, reply: &R) -> Result<(), ConnectionError>
    where
        R: Request,
    {
        let InterceptState::MustRespond { code } = &self.state else {
            return Err(ConnectionError::NoPendingCode);
        };
        debug!(
            target: CONNECTION_TARGET,
            code = %code,
            reply = R::NAME,
            "answering intercepted code"
        );
        self.connection.send(reply)?;
        self.state = InterceptState::WaitingForCode;
        Ok(())
    }
}

impl CommandSession for InterceptConnection {
    fn connection(&mut self) -> &mut Connection {
        &mut self.connection
    }
}
