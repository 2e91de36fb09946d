// Decode `GET /containers/{id}/stats?stream=false` into a ContainerStats sample.

use super::error::ParseError;
use crate::models::ContainerStats;
use serde_json::Value;

/// The only network interface whose counters are read.
pub const NETWORK_INTERFACE: &str = "eth0";

/// Every numeric leaf is optional; missing or non-numeric values stay at zero,
/// except `online_cpus` which defaults to 1.
/// The timestamp is the decode time, not taken from the payload.
pub fn decode_stats(body: &str) -> Result<ContainerStats, ParseError> {
    let root: Value = serde_json::from_str(body)?;
    if !root.is_object() {
        return Err(ParseError::NotAnObject);
    }

    let u64_at = |pointer: &str| root.pointer(pointer).and_then(Value::as_u64).unwrap_or(0);

    let (block_read_bytes, block_write_bytes) = root
        .pointer("/blkio_stats/io_service_bytes_recursive")
        .and_then(Value::as_array)
        .map_or((0u64, 0u64), |entries| {
            let mut read = 0u64;
            let mut write = 0u64;
            for e in entries {
                let value = e.get("value").and_then(Value::as_u64).unwrap_or(0);
                match e.get("op").and_then(Value::as_str) {
                    Some(op) if op.eq_ignore_ascii_case("read") => {
                        read = read.saturating_add(value)
                    }
                    Some(op) if op.eq_ignore_ascii_case("write") => {
                        write = write.saturating_add(value)
                    }
                    _ => {}
                }
            }
            (read, write)
        });

    let online_cpus = root
        .pointer("/cpu_stats/online_cpus")
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0)
        .unwrap_or(1);

    Ok(ContainerStats {
        cpu_usage: u64_at("/cpu_stats/cpu_usage/total_usage"),
        cpu_system_usage: u64_at("/cpu_stats/system_cpu_usage"),
        online_cpus,
        memory_usage: u64_at("/memory_stats/usage"),
        memory_limit: u64_at("/memory_stats/limit"),
        network_rx_bytes: u64_at(&format!("/networks/{}/rx_bytes", NETWORK_INTERFACE)),
        network_tx_bytes: u64_at(&format!("/networks/{}/tx_bytes", NETWORK_INTERFACE)),
        block_read_bytes,
        block_write_bytes,
        timestamp: chrono::Utc::now().timestamp(),
    })
}
