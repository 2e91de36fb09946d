// Daemon endpoint configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Well-known local socket of the Docker daemon.
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/docker.sock";

/// Where and how to reach the daemon. TLS material is carried but only checked
/// for presence; the transport refuses TLS endpoints rather than downgrading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaemonEndpoint {
    pub host: String,
    pub port: u16,
    pub socket_path: PathBuf,
    pub tls: bool,
    pub cert_path: Option<PathBuf>,
    pub key_path: Option<PathBuf>,
    pub ca_path: Option<PathBuf>,
}

impl Default for DaemonEndpoint {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 2375,
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            tls: false,
            cert_path: None,
            key_path: None,
            ca_path: None,
        }
    }
}

/// Resolved addressing mode for one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaemonAddress {
    Unix(PathBuf),
    Tcp { host: String, port: u16 },
}

impl DaemonEndpoint {
    /// `localhost` and `127.0.0.1` go through the local socket; anything else is TCP.
    pub fn is_local(&self) -> bool {
        self.host == "localhost" || self.host == "127.0.0.1"
    }

    pub fn address(&self) -> DaemonAddress {
        if self.is_local() {
            DaemonAddress::Unix(self.socket_path.clone())
        } else {
            DaemonAddress::Tcp {
                host: self.host.clone(),
                port: self.port,
            }
        }
    }

    /// Value for the `Host` request header.
    pub fn host_header(&self) -> String {
        if self.is_local() {
            "localhost".into()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl std::fmt::Display for DaemonEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.address() {
            DaemonAddress::Unix(path) => write!(f, "unix://{}", path.display()),
            DaemonAddress::Tcp { host, port } => {
                write!(f, "tcp://{}:{}", host, port)?;
                if self.tls {
                    write!(f, " (TLS)")?;
                }
                Ok(())
            }
        }
    }
}
