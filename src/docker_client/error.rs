// Typed failures of the daemon client

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("docker socket not found at {}; make sure the daemon is running", .0.display())]
    SocketNotFound(PathBuf),
    #[error("failed to connect to {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to resolve host {host}: {reason}")]
    Resolve { host: String, reason: String },
    #[error("TLS connections to {0} are not supported; use a plain TCP endpoint or the local socket")]
    TlsUnsupported(String),
    #[error("unix sockets are not available on this platform")]
    UnixUnsupported,
}

#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("failed to write request: {0}")]
    Write(#[source] std::io::Error),
    #[error("failed to read response: {0}")]
    Read(#[source] std::io::Error),
    #[error("daemon closed the connection without responding")]
    EmptyResponse,
    #[error("response exceeds {limit} bytes")]
    ResponseTooLarge { limit: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("expected a JSON array")]
    NotAnArray,
    #[error("expected a JSON object")]
    NotAnObject,
}

/// Any failure of one request against the daemon.
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}
