// Console rendering of the monitor state. Every helper returns an owned String.

use crate::monitor::MonitorState;
use crate::version;
use chrono::{DateTime, Local};
use std::fmt::Write;

const SEPARATOR: &str = "----------------------------------------------------------------";
const BANNER_RULE: &str = "================================================================";

/// Output style selected by config / CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Full,
    Summary,
    Json,
}

/// "512 B", "1.50 KB", ... up to TB.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit])
    }
}

pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value)
}

/// "3d 04h 05m 06s", "04h 05m 06s", "05m 06s" or "06s".
pub fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if days > 0 {
        format!("{}d {:02}h {:02}m {:02}s", days, hours, minutes, seconds)
    } else if hours > 0 {
        format!("{:02}h {:02}m {:02}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{:02}m {:02}s", minutes, seconds)
    } else {
        format!("{:02}s", seconds)
    }
}

pub fn banner(state: &MonitorState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", BANNER_RULE);
    let _ = writeln!(out, "{:^64}", "DOCKER CONTAINER MONITOR");
    let _ = writeln!(out, "{:^64}", version::version_line());
    let _ = writeln!(out, "{}", BANNER_RULE);
    let _ = writeln!(out, "Refresh interval: {} seconds", state.interval_secs);
    let _ = writeln!(out, "Docker endpoint: {}", state.endpoint);
    if let Some(filter) = &state.filter {
        let _ = writeln!(out, "Monitoring container: {}", filter);
    }
    let _ = writeln!(out, "Press Ctrl+C to stop");
    out
}

/// Per-container listing.
pub fn render_full(state: &MonitorState, now: DateTime<Local>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\n[{}] Container stats ({} containers)",
        now.format("%H:%M:%S"),
        state.containers.len()
    );
    let _ = writeln!(out, "{}", SEPARATOR);

    for c in &state.containers {
        let _ = writeln!(out, "Container: {}", c.info.name);
        let _ = writeln!(out, "ID: {}", c.info.id);
        let _ = writeln!(out, "Image: {}", c.info.image);
        let _ = writeln!(out, "Status: {}", c.info.status);
        let _ = writeln!(
            out,
            "Age: {}",
            format_duration(now.timestamp() - c.info.created)
        );

        if c.is_running {
            let s = &c.stats;
            let _ = writeln!(
                out,
                "Memory: {} / {} ({})",
                format_bytes(s.memory_usage),
                format_bytes(s.memory_limit),
                format_percentage(c.memory_percent)
            );
            let _ = writeln!(out, "CPU: {}", format_percentage(c.cpu_percent));
            let _ = writeln!(
                out,
                "Network RX: {} | TX: {}",
                format_bytes(s.network_rx_bytes),
                format_bytes(s.network_tx_bytes)
            );
            let _ = writeln!(
                out,
                "Block read: {} | write: {}",
                format_bytes(s.block_read_bytes),
                format_bytes(s.block_write_bytes)
            );
        } else if c.info.is_up() {
            let _ = writeln!(out, "Stats unavailable (last fetch failed)");
        } else {
            let _ = writeln!(out, "Container is not running");
        }
        let _ = writeln!(out, "-----");
    }
    out
}

/// One line: live/total containers and summed memory of live containers.
pub fn render_summary(state: &MonitorState, now: DateTime<Local>) -> String {
    let s = state.summary();
    format!(
        "[{}] Summary: {}/{} containers running | Memory: {} / {}",
        now.format("%H:%M:%S"),
        s.running,
        s.total,
        format_bytes(s.memory_usage),
        format_bytes(s.memory_limit)
    )
}

pub fn render_json(state: &MonitorState) -> serde_json::Result<String> {
    serde_json::to_string(state)
}

pub fn render(state: &MonitorState, format: OutputFormat) -> serde_json::Result<String> {
    let now = Local::now();
    Ok(match format {
        OutputFormat::Full => render_full(state, now),
        OutputFormat::Summary => render_summary(state, now),
        OutputFormat::Json => render_json(state)?,
    })
}
