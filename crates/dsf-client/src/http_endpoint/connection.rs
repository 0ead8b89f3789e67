//! One forwarded HTTP exchange.

use std::os::unix::net::UnixStream;

use dsf_types::HttpResponseType;
use serde_json::Value;

use super::{ReceivedHttpRequest, SendHttpResponse};
use crate::codec::JsonStream;
use crate::error::ConnectionError;

/// A connection accepted on an endpoint socket.
///
/// Plain HTTP endpoints carry one request and one response. WebSocket
/// endpoints stay open and may exchange any number of messages.
#[derive(Debug)]
pub struct HttpEndpointConnection {
    stream: JsonStream,
    is_websocket: bool,
}

impl HttpEndpointConnection {
    pub(crate) fn new(stream: UnixStream, is_websocket: bool) -> Result<Self, ConnectionError> {
        Ok(Self {
            stream: JsonStream::from_stream(stream)?,
            is_websocket,
        })
    }

    /// Returns true for WebSocket endpoints.
    #[must_use]
    pub const fn is_websocket(&self) -> bool {
        self.is_websocket
    }

    /// Reads the forwarded request, or `None` when the web server hung up.
    ///
    /// # Errors
    ///
    /// Returns transport and decode errors.
    pub fn read_request(&mut self) -> Result<Option<ReceivedHttpRequest>, ConnectionError> {
        self.stream.receive()
    }

    /// Reads the next WebSocket message as raw JSON.
    ///
    /// # Errors
    ///
    /// Returns transport and decode errors.
    pub fn read_message(&mut self) -> Result<Option<Value>, ConnectionError> {
        self.stream.receive()
    }

    /// Sends the response. Non-WebSocket connections are closed afterwards,
    /// whether or not the send succeeded.
    ///
    /// # Errors
    ///
    /// Returns encode and transport errors.
    pub fn send_response(
        &mut self,
        status_code: u16,
        response: &str,
        response_type: HttpResponseType,
    ) -> Result<(), ConnectionError> {
        let sent = self.stream.send(&SendHttpResponse {
            status_code,
            response: response.to_owned(),
            response_type,
        });
        if self.is_websocket {
            return sent;
        }
        let closed = self.close();
        sent.and(closed)
    }

    /// Shuts the connection down.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Send`] when the socket cannot be shut
    /// down.
    pub fn close(&self) -> Result<(), ConnectionError> {
        self.stream
            .close()
            .map_err(|source| ConnectionError::Send { source })
    }
}
