//! Client for the Duet Software Framework control server.
//!
//! The control server listens on a Unix socket and exchanges bare JSON
//! values with its clients. Each connection picks one role during its
//! handshake:
//!
//! - [`CommandConnection`] sends requests and waits for their responses.
//! - [`SubscribeConnection`] receives object model updates and acknowledges
//!   each one.
//! - [`InterceptConnection`] sees codes before, after or instead of their
//!   execution and must answer every intercepted code.
//!
//! Calls block. Programs that need several roles open one connection per
//! role, usually each on its own thread, and register every connection
//! with a [`ShutdownCoordinator`] so a termination signal unblocks them.
//!
//! ```no_run
//! use dsf_client::{CommandConnection, CommandSession};
//! use dsf_types::CodeChannel;
//!
//! # fn main() -> Result<(), dsf_client::ConnectionError> {
//! let mut connection = CommandConnection::connect("/run/dsf/dcs.sock".as_ref())?;
//! let reply = connection.perform_simple_code("M115", CodeChannel::Sbc)?;
//! assert!(!reply.is_empty());
//! # Ok(())
//! # }
//! ```

mod codec;
pub mod commands;
mod connection;
mod error;
pub mod http_endpoint;
mod init;
pub mod shutdown;
pub mod telemetry;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use self::codec::{JsonStream, SocketCloser};
pub use self::connection::{
    CommandConnection, CommandSession, Connection, InterceptConnection, InterceptOptions,
    SubscribeConnection, SubscribeOptions,
};
pub use self::error::{
    CommandError, ConnectionError, INCOMPATIBLE_VERSION_EXCEPTION, TASK_CANCELED_EXCEPTION,
};
pub use self::http_endpoint::{HttpEndpointConnection, HttpEndpointHandler, HttpEndpointSocket};
pub use self::init::{
    ClientInitMessage, CommandInitMessage, ConnectionMode, InterceptInitMessage,
    InterceptionMode, PROTOCOL_VERSION, ServerInitMessage, SubscribeInitMessage,
    SubscriptionMode,
};
pub use self::shutdown::{Closer, ShutdownCoordinator};

#[cfg(test)]
mod tests;
