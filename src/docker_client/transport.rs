// Short-lived connections to the daemon: local unix socket or plain TCP.

use super::error::{ConnectError, ExchangeError};
use super::exchange;
use crate::models::{DaemonAddress, DaemonEndpoint};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
#[cfg(unix)]
use tokio::net::UnixStream;

/// One connection, good for exactly one request/response exchange.
#[derive(Debug)]
pub enum Connection {
    #[cfg(unix)]
    Unix(UnixStream),
    Tcp(TcpStream),
}

impl Connection {
    /// Writes `request` and reads until the daemon closes; returns the body text.
    pub async fn exchange(&mut self, request: &str) -> Result<String, ExchangeError> {
        match self {
            #[cfg(unix)]
            Connection::Unix(s) => exchange::exchange(s, request).await,
            Connection::Tcp(s) => exchange::exchange(s, request).await,
        }
    }

    pub async fn close(self) {
        let result = match self {
            #[cfg(unix)]
            Connection::Unix(mut s) => s.shutdown().await,
            Connection::Tcp(mut s) => s.shutdown().await,
        };
        if let Err(e) = result {
            tracing::trace!(error = %e, "shutdown after exchange failed");
        }
    }
}

/// Opens a fresh connection to `endpoint`. No pooling, no retry.
pub async fn connect(endpoint: &DaemonEndpoint) -> Result<Connection, ConnectError> {
    match endpoint.address() {
        DaemonAddress::Unix(path) => connect_unix(&path).await,
        DaemonAddress::Tcp { host, port } => {
            if endpoint.tls {
                return Err(ConnectError::TlsUnsupported(format!("{}:{}", host, port)));
            }
            connect_tcp(&host, port).await
        }
    }
}

#[cfg(unix)]
async fn connect_unix(path: &Path) -> Result<Connection, ConnectError> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(ConnectError::SocketNotFound(path.to_path_buf()));
    }
    let stream = UnixStream::connect(path)
        .await
        .map_err(|source| ConnectError::Connect {
            target: path.display().to_string(),
            source,
        })?;
    Ok(Connection::Unix(stream))
}

#[cfg(not(unix))]
async fn connect_unix(_path: &Path) -> Result<Connection, ConnectError> {
    Err(ConnectError::UnixUnsupported)
}

async fn connect_tcp(host: &str, port: u16) -> Result<Connection, ConnectError> {
    let addr = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| ConnectError::Resolve {
            host: host.to_string(),
            reason: e.to_string(),
        })?
        .next()
        .ok_or_else(|| ConnectError::Resolve {
            host: host.to_string(),
            reason: "no addresses returned".into(),
        })?;
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|source| ConnectError::Connect {
            target: addr.to_string(),
            source,
        })?;
    Ok(Connection::Tcp(stream))
}
