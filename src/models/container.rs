// Docker container models

use serde::{Deserialize, Serialize};

/// Display name used when the daemon reports no usable name.
pub const UNKNOWN_NAME: &str = "unknown";

/// Static identity of a container as reported by `GET /containers/json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerDescriptor {
    /// Daemon-assigned id; join key between the list and stats queries.
    pub id: String,
    pub name: String,
    pub image: String,
    /// Human status, e.g. "Up 2 hours".
    pub status: String,
    /// Creation time, epoch seconds.
    pub created: i64,
    /// Wall-clock time of the poll that produced this descriptor, epoch seconds.
    pub last_seen: i64,
}

impl ContainerDescriptor {
    /// Docker prefixes the status of running containers with "Up".
    pub fn is_up(&self) -> bool {
        self.status.starts_with("Up")
    }
}

/// One-shot resource usage sample. Every field is zero unless the payload supplied it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerStats {
    pub cpu_usage: u64,
    pub cpu_system_usage: u64,
    #[serde(default)]
    pub online_cpus: u32,
    pub memory_usage: u64,
    pub memory_limit: u64,
    pub network_rx_bytes: u64,
    pub network_tx_bytes: u64,
    #[serde(default)]
    pub block_read_bytes: u64,
    #[serde(default)]
    pub block_write_bytes: u64,
    /// Decode time, epoch seconds.
    pub timestamp: i64,
}

/// CPU counters retained from the previous successful sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuSample {
    pub total_usage: u64,
    pub system_usage: u64,
}

impl From<&ContainerStats> for CpuSample {
    fn from(s: &ContainerStats) -> Self {
        Self {
            total_usage: s.cpu_usage,
            system_usage: s.cpu_system_usage,
        }
    }
}

/// Descriptor + latest stats + derived metrics for one container.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerRecord {
    pub info: ContainerDescriptor,
    pub stats: ContainerStats,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    /// Whether the most recent stats fetch for this container succeeded.
    pub is_running: bool,
    #[serde(skip)]
    pub previous_cpu: Option<CpuSample>,
}

impl ContainerRecord {
    pub fn new(info: ContainerDescriptor) -> Self {
        Self {
            info,
            stats: ContainerStats::default(),
            cpu_percent: 0.0,
            memory_percent: 0.0,
            is_running: false,
            previous_cpu: None,
        }
    }
}
