use std::fmt;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

const UNIX_SCHEME: &str = "unix";

/// Unix domain socket of the control server.
///
/// Written either as an absolute path or as a `unix:///path` URL.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub struct SocketEndpoint {
    path: Utf8PathBuf,
}

impl SocketEndpoint {
    /// Builds an endpoint for the socket at `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the socket path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        self.path.as_path()
    }

    /// Returns the directory containing the socket.
    #[must_use]
    pub fn directory(&self) -> Option<&Utf8Path> {
        self.path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
    }
}

impl fmt::Display for SocketEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{UNIX_SCHEME}://{}", self.path)
    }
}

impl FromStr for SocketEndpoint {
    type Err = SocketParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SocketParseError::Empty);
        }
        if trimmed.starts_with('/') {
            return Ok(Self::new(trimmed));
        }

        let url = Url::parse(trimmed)?;
        if url.scheme() != UNIX_SCHEME {
            return Err(SocketParseError::UnsupportedScheme(url.scheme().to_owned()));
        }
        let path = url.path();
        if path.is_empty() || path == "/" {
            return Err(SocketParseError::MissingUnixPath(input.to_owned()));
        }
        Ok(Self::new(path))
    }
}

impl TryFrom<String> for SocketEndpoint {
    type Error = SocketParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SocketEndpoint> for String {
    fn from(value: SocketEndpoint) -> Self {
        value.to_string()
    }
}

/// Errors encountered while parsing a [`SocketEndpoint`] from text.
#[derive(Debug, Error)]
pub enum SocketParseError {
    /// The endpoint text was blank.
    #[error("socket endpoint must not be empty")]
    Empty,
    /// Scheme was not `unix`.
    #[error("unsupported socket scheme '{0}'")]
    UnsupportedScheme(String),
    /// Unix socket path was absent.
    #[error("missing Unix socket path in '{0}'")]
    MissingUnixPath(String),
    /// Neither an absolute path nor a valid URL.
    #[error(transparent)]
    Url(#[from] url::ParseError),
}
