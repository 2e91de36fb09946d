use std::path::PathBuf;

use clap::Parser;

/// Monitor CPU/RAM/network usage of Docker containers.
#[derive(Parser, Debug, Default)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the config file (default: $CONFIG_FILE or config.toml).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Refresh interval in seconds.
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Only monitor the container with this name (or id prefix).
    #[arg(short = 'c', long)]
    pub container: Option<String>,

    /// Docker host; "localhost" uses the local socket.
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Docker TCP port.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Request a TLS connection.
    #[arg(long)]
    pub tls: bool,

    /// Client certificate path.
    #[arg(long)]
    pub cert: Option<PathBuf>,

    /// Client key path.
    #[arg(long)]
    pub key: Option<PathBuf>,

    /// CA certificate path.
    #[arg(long)]
    pub ca: Option<PathBuf>,

    /// Print each cycle as JSON.
    #[arg(short, long, conflicts_with = "summary")]
    pub json: bool,

    /// Print only a one-line summary per cycle.
    #[arg(short, long)]
    pub summary: bool,
}
