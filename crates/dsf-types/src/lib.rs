//! Data types shared by Duet Software Framework clients.
//!
//! The control server speaks JSON over a Unix socket. This crate holds the
//! values that travel across it: typed code parameters and their text
//! parser, driver identifiers, the [`Code`] model with byte-exact text
//! reconstruction, code channels, messages, HTTP endpoint and user-session
//! descriptors, and the object-model entries whose shape depends on a tag.
//!
//! Nothing here performs I/O; the connection roles live in `dsf-client`.

mod channel;
mod code;
mod driver_id;
mod error;
mod http;
mod message;
pub mod model;
mod parameter;
mod session;

pub use self::channel::CodeChannel;
pub use self::code::{Code, CodeFlags, CodeType, KeywordType};
pub use self::driver_id::{DriverId, DriverIdError};
pub use self::error::UnknownDiscriminant;
pub use self::http::{HttpEndpoint, HttpEndpointType, HttpResponseType, RRF_NAMESPACE};
pub use self::message::{CodeResult, LogLevel, Message, MessageType};
pub use self::parameter::{
    Parameter, ParameterError, ParameterValue, UNPRECEDENTED_LETTER, ValueKind,
};
pub use self::session::{
    AccessLevel, SbcPermissions, SessionType, UnknownPermission, UserSession,
};

#[cfg(test)]
mod tests;
