//! Layered configuration for Duet Software Framework clients.
//!
//! Values are merged from built-in defaults, an optional TOML file named by
//! `--config-path`, `DSF_*` environment variables and command-line flags,
//! with later layers taking precedence.

mod defaults;
mod logging;
mod socket;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use self::defaults::{
    DEFAULT_LOG_FILTER, SOCKET_DIRECTORY, SOCKET_FILE, default_log_filter,
    default_log_filter_string, default_log_format, default_socket_endpoint,
};
pub use self::logging::LogFormat;
pub use self::socket::{SocketEndpoint, SocketParseError};

/// Resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "DSF")]
pub struct Config {
    /// Control server socket.
    #[ortho_config(default = default_socket_endpoint())]
    pub socket: SocketEndpoint,
    /// `tracing` filter directive, such as `info` or `dsf_client=debug`.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format of log events.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Config {
    /// Returns the control server socket.
    #[must_use]
    pub const fn socket(&self) -> &SocketEndpoint {
        &self.socket
    }

    /// Returns the log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Returns the log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket: default_socket_endpoint(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}
