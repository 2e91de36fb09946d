use crate::cli::Args;
use crate::models::{DEFAULT_SOCKET_PATH, DaemonEndpoint};
use crate::render::OutputFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub daemon: DaemonConfig,
    pub monitoring: MonitoringConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub host: String,
    pub port: u16,
    pub socket_path: PathBuf,
    pub tls: bool,
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    pub ca_path: PathBuf,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 2375,
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            tls: false,
            cert_path: PathBuf::new(),
            key_path: PathBuf::new(),
            ca_path: PathBuf::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub interval_secs: u64,
    /// Container name (or id prefix) to monitor; empty monitors all.
    pub container: String,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            container: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

fn non_empty(p: &Path) -> Option<PathBuf> {
    (!p.as_os_str().is_empty()).then(|| p.to_path_buf())
}

impl AppConfig {
    /// Loads the file named by `--config`, `CONFIG_FILE` or `config.toml`, applies
    /// CLI overrides, then validates. Only the implicit default file may be absent.
    pub fn load(args: &Args) -> anyhow::Result<Self> {
        let explicit = args
            .config
            .clone()
            .or_else(|| std::env::var_os("CONFIG_FILE").map(PathBuf::from));
        let mut config = match explicit {
            Some(path) => {
                let s = std::fs::read_to_string(&path)
                    .map_err(|e| anyhow::anyhow!("config {}: {}", path.display(), e))?;
                Self::parse(&s)?
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::parse(&std::fs::read_to_string(DEFAULT_CONFIG_FILE)?)?
            }
            None => Self::default(),
        };
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config = Self::parse(s)?;
        config.validate()?;
        Ok(config)
    }

    fn parse(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Command-line flags win over file values.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(interval) = args.interval {
            self.monitoring.interval_secs = interval;
        }
        if let Some(container) = &args.container {
            self.monitoring.container = container.clone();
        }
        if let Some(host) = &args.host {
            self.daemon.host = host.clone();
        }
        if let Some(port) = args.port {
            self.daemon.port = port;
        }
        if args.tls {
            self.daemon.tls = true;
        }
        if let Some(cert) = &args.cert {
            self.daemon.cert_path = cert.clone();
        }
        if let Some(key) = &args.key {
            self.daemon.key_path = key.clone();
        }
        if let Some(ca) = &args.ca {
            self.daemon.ca_path = ca.clone();
        }
        if args.json {
            self.output.format = OutputFormat::Json;
        } else if args.summary {
            self.output.format = OutputFormat::Summary;
        }
    }

    pub fn endpoint(&self) -> DaemonEndpoint {
        DaemonEndpoint {
            host: self.daemon.host.clone(),
            port: self.daemon.port,
            socket_path: self.daemon.socket_path.clone(),
            tls: self.daemon.tls,
            cert_path: non_empty(&self.daemon.cert_path),
            key_path: non_empty(&self.daemon.key_path),
            ca_path: non_empty(&self.daemon.ca_path),
        }
    }

    pub fn container_filter(&self) -> Option<String> {
        Some(self.monitoring.container.clone()).filter(|c| !c.is_empty())
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.daemon.host.is_empty(), "daemon.host must be non-empty");
        anyhow::ensure!(
            self.daemon.port > 0,
            "daemon.port must be between 1 and 65535, got {}",
            self.daemon.port
        );
        anyhow::ensure!(
            !self.daemon.socket_path.as_os_str().is_empty(),
            "daemon.socket_path must be non-empty"
        );
        if self.daemon.tls {
            anyhow::ensure!(
                non_empty(&self.daemon.cert_path).is_some()
                    && non_empty(&self.daemon.key_path).is_some()
                    && non_empty(&self.daemon.ca_path).is_some(),
                "daemon.tls requires daemon.cert_path, daemon.key_path and daemon.ca_path"
            );
        }
        anyhow::ensure!(
            self.monitoring.interval_secs > 0,
            "monitoring.interval_secs must be > 0, got {}",
            self.monitoring.interval_secs
        );
        Ok(())
    }
}
