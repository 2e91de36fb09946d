// Shared test helpers: a fake docker daemon serving canned HTTP responses.
#![allow(dead_code)]

use docker_monitor::models::DaemonEndpoint;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, UnixListener};

pub const LIST_ONE: &str = r#"[{"Id":"abc123","Names":["/web"],"Image":"nginx","Status":"Up 2 hours","Created":1690000000}]"#;

pub const LIST_TWO: &str = r#"[
    {"Id":"abc123","Names":["/web"],"Image":"nginx","Status":"Up 2 hours","Created":1690000000},
    {"Id":"def456","Names":["/db"],"Image":"postgres","Status":"Up 1 hour","Created":1690000100}
]"#;

pub const STATS_WEB: &str = r#"{"cpu_stats":{"cpu_usage":{"total_usage":500},"system_cpu_usage":10000},"memory_stats":{"usage":1048576,"limit":2097152},"networks":{"eth0":{"rx_bytes":100,"tx_bytes":200}}}"#;

pub const STATS_DB: &str = r#"{"cpu_stats":{"cpu_usage":{"total_usage":100},"system_cpu_usage":10000},"memory_stats":{"usage":1000,"limit":4000}}"#;

#[derive(Debug, Clone)]
pub enum Reply {
    /// Full HTTP response with the given status and body.
    Http(u16, String),
    /// Bytes written verbatim.
    Raw(Vec<u8>),
    /// Close without writing anything.
    Close,
}

pub fn ok(body: &str) -> Reply {
    Reply::Http(200, body.to_string())
}

#[derive(Clone, Default)]
pub struct Routes {
    replies: Arc<Mutex<HashMap<String, Reply>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl Routes {
    pub fn set(&self, path: &str, reply: Reply) {
        self.replies.lock().unwrap().insert(path.to_string(), reply);
    }

    /// Raw request texts received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|r| r.split_whitespace().nth(1).map(str::to_string))
            .collect()
    }

    fn reply_for(&self, path: &str) -> Reply {
        self.replies
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_else(|| Reply::Http(404, r#"{"message":"not found"}"#.into()))
    }
}

pub struct FakeDaemon {
    pub routes: Routes,
    pub endpoint: DaemonEndpoint,
    _dir: Option<tempfile::TempDir>,
}

impl FakeDaemon {
    /// Listens on a unix socket inside a temp dir; endpoint host stays "localhost".
    pub async fn unix() -> Self {
        let dir = tempfile::TempDir::new().unwrap();
        let socket_path: PathBuf = dir.path().join("docker.sock");
        let listener = UnixListener::bind(&socket_path).unwrap();
        let routes = Routes::default();
        let r = routes.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(handle(stream, r.clone()));
            }
        });
        Self {
            routes,
            endpoint: DaemonEndpoint {
                socket_path,
                ..Default::default()
            },
            _dir: Some(dir),
        }
    }

    /// Listens on 127.0.0.2 so the endpoint is treated as remote TCP.
    pub async fn tcp() -> Self {
        let listener = TcpListener::bind("127.0.0.2:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let routes = Routes::default();
        let r = routes.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(handle(stream, r.clone()));
            }
        });
        Self {
            routes,
            endpoint: DaemonEndpoint {
                host: "127.0.0.2".into(),
                port,
                ..Default::default()
            },
            _dir: None,
        }
    }
}

async fn handle<S>(mut stream: S, routes: Routes)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    let request = String::from_utf8_lossy(&buf).into_owned();
    let path = request
        .split_whitespace()
        .nth(1)
        .unwrap_or_default()
        .to_string();
    routes.requests.lock().unwrap().push(request);

    match routes.reply_for(&path) {
        Reply::Http(status, body) => {
            let response = format!(
                "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
        }
        Reply::Raw(bytes) => {
            let _ = stream.write_all(&bytes).await;
        }
        Reply::Close => {}
    }
    let _ = stream.shutdown().await;
}
