use crate::logging::LogFormat;
use crate::socket::SocketEndpoint;

/// Directory holding the control server's sockets.
pub const SOCKET_DIRECTORY: &str = "/run/dsf";

/// File name of the control server's main socket.
pub const SOCKET_FILE: &str = "dcs.sock";

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::default()
}

/// Socket of a control server installed in the standard location.
#[must_use]
pub fn default_socket_endpoint() -> SocketEndpoint {
    SocketEndpoint::new(format!("{SOCKET_DIRECTORY}/{SOCKET_FILE}"))
}
