//! Error types
//!
//! Startup errors are fatal and end the process with a non-zero exit code.
//! Resolution errors never leave a request: they become a status code.

use hyper::StatusCode;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Errors that abort the process before or while the listener runs
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid port argument '{0}' (expected 0-65535)")]
    InvalidPort(String),

    #[error("unexpected argument '{0}'; usage: ota-devserver [port]")]
    UnexpectedArgument(String),

    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    #[error("root directory '{}' is not usable: {source}", .path.display())]
    Root { path: PathBuf, source: io::Error },

    #[error("failed to bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },

    #[error("runtime error: {0}")]
    Runtime(#[from] io::Error),
}

/// Errors raised while creating the example directory layout
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("failed to create directory '{}': {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to write '{}': {source}", .path.display())]
    WriteFile { path: PathBuf, source: io::Error },

    #[error("failed to encode example manifest: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Outcome of mapping a request path onto the root directory
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The path escapes the root or contains forbidden characters
    #[error("path escapes the served root")]
    Forbidden,

    #[error("no such file or directory")]
    NotFound,

    /// Any other filesystem failure (permissions, I/O)
    #[error("filesystem error: {0}")]
    Io(#[source] io::Error),
}

impl ResolveError {
    /// Status code sent to the client for this error
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<io::Error> for ResolveError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => Self::NotFound,
            _ => Self::Io(err),
        }
    }
}
