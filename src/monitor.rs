// Monitor state: bounded per-container records merged across poll cycles.

use crate::docker_client::{DaemonError, DockerClient};
use crate::models::{ContainerDescriptor, ContainerRecord, ContainerStats, CpuSample, DaemonEndpoint};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Most containers tracked at once.
pub const MAX_CONTAINERS: usize = 100;

/// `usage / limit * 100`, or 0 when the limit is unknown.
pub fn memory_percent(usage: u64, limit: u64) -> f64 {
    if limit > 0 {
        usage as f64 / limit as f64 * 100.0
    } else {
        0.0
    }
}

/// Delta-based CPU usage between two samples, scaled by online CPUs (1 when unknown).
/// Zero without a previous sample or when either counter did not advance.
pub fn cpu_percent(previous: Option<CpuSample>, current: &ContainerStats) -> f64 {
    let Some(prev) = previous else {
        return 0.0;
    };
    let cpu_delta = current.cpu_usage.saturating_sub(prev.total_usage);
    let system_delta = current.cpu_system_usage.saturating_sub(prev.system_usage);
    if cpu_delta == 0 || system_delta == 0 {
        return 0.0;
    }
    let online = current.online_cpus.max(1) as f64;
    cpu_delta as f64 / system_delta as f64 * online * 100.0
}

impl ContainerRecord {
    /// Stores a successful sample and recomputes derived metrics.
    pub fn apply_stats(&mut self, stats: ContainerStats) {
        self.cpu_percent = cpu_percent(self.previous_cpu, &stats);
        self.memory_percent = memory_percent(stats.memory_usage, stats.memory_limit);
        self.previous_cpu = Some(CpuSample::from(&stats));
        self.stats = stats;
        self.is_running = true;
    }

    /// Failed fetch: previous stats are kept as they were.
    pub fn mark_unreachable(&mut self) {
        self.is_running = false;
    }
}

/// Fixed-capacity collection of records. Overflow policy: truncate and warn.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct ContainerSet {
    records: Vec<ContainerRecord>,
    #[serde(skip)]
    capacity: usize,
}

impl Default for ContainerSet {
    fn default() -> Self {
        Self::with_capacity(MAX_CONTAINERS)
    }
}

impl ContainerSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ContainerRecord> {
        self.records.iter()
    }

    pub fn get(&self, id: &str) -> Option<&ContainerRecord> {
        self.records.iter().find(|r| r.info.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut ContainerRecord> {
        self.records.iter_mut().find(|r| r.info.id == id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.records.iter().map(|r| r.info.id.clone()).collect()
    }

    /// Replaces the descriptor list wholesale. Records whose id is still reported
    /// keep their stats; the rest disappear. Returns the number of descriptors
    /// dropped for lack of capacity.
    pub fn replace_descriptors(&mut self, descriptors: Vec<ContainerDescriptor>) -> usize {
        let dropped = descriptors.len().saturating_sub(self.capacity);
        if dropped > 0 {
            warn!(
                capacity = self.capacity,
                dropped, "too many containers; extra entries dropped"
            );
        }
        let mut previous: HashMap<String, ContainerRecord> = self
            .records
            .drain(..)
            .map(|r| (r.info.id.clone(), r))
            .collect();
        for d in descriptors.into_iter().take(self.capacity) {
            let record = match previous.remove(&d.id) {
                Some(mut r) => {
                    r.info = d;
                    r
                }
                None => ContainerRecord::new(d),
            };
            self.records.push(record);
        }
        dropped
    }
}

impl<'a> IntoIterator for &'a ContainerSet {
    type Item = &'a ContainerRecord;
    type IntoIter = std::slice::Iter<'a, ContainerRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Aggregate over live containers, for the one-line summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub running: usize,
    pub total: usize,
    pub memory_usage: u64,
    pub memory_limit: u64,
}

/// Result of one stats phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsOutcome {
    pub succeeded: usize,
    pub failed: usize,
    pub interrupted: bool,
}

/// Result of one full list + stats cycle.
#[derive(Debug)]
pub enum CycleOutcome {
    Completed(StatsOutcome),
    /// The list phase failed; descriptors were left untouched and stats skipped.
    ListFailed(DaemonError),
    /// Stop was requested before the cycle finished.
    Interrupted,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorState {
    pub containers: ContainerSet,
    /// Completed list phases.
    pub cycle: u64,
    /// Epoch seconds of the last successful list phase.
    pub last_update: i64,
    pub interval_secs: u64,
    pub running: bool,
    pub endpoint: DaemonEndpoint,
    /// Only containers whose name, or id prefix, matches are kept.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl MonitorState {
    pub fn new(interval_secs: u64, endpoint: DaemonEndpoint) -> Self {
        Self {
            containers: ContainerSet::default(),
            cycle: 0,
            last_update: chrono::Utc::now().timestamp(),
            interval_secs,
            running: true,
            endpoint,
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter.filter(|f| !f.is_empty());
        self
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    fn matches_filter(&self, d: &ContainerDescriptor) -> bool {
        match &self.filter {
            Some(f) => d.name == *f || d.id.starts_with(f.as_str()),
            None => true,
        }
    }

    /// Successful list phase: filter, replace descriptors, bump bookkeeping.
    pub fn apply_container_list(&mut self, descriptors: Vec<ContainerDescriptor>) {
        let descriptors: Vec<_> = descriptors
            .into_iter()
            .filter(|d| self.matches_filter(d))
            .collect();
        self.containers.replace_descriptors(descriptors);
        self.cycle += 1;
        self.last_update = chrono::Utc::now().timestamp();
    }

    /// Returns false when `id` is no longer tracked.
    pub fn record_stats(&mut self, id: &str, stats: ContainerStats) -> bool {
        match self.containers.get_mut(id) {
            Some(r) => {
                r.apply_stats(stats);
                true
            }
            None => false,
        }
    }

    pub fn record_failure(&mut self, id: &str) -> bool {
        match self.containers.get_mut(id) {
            Some(r) => {
                r.mark_unreachable();
                true
            }
            None => false,
        }
    }

    /// List phase. On failure the previous descriptors stay as they were.
    /// With a filter the whole list is decoded, so the cap applies to matches only.
    pub async fn refresh_list(&mut self, client: &DockerClient) -> Result<usize, DaemonError> {
        let max_count = match self.filter {
            Some(_) => usize::MAX,
            None => self.containers.capacity(),
        };
        let descriptors = client.list_containers(max_count).await?;
        self.apply_container_list(descriptors);
        debug!(
            cycle = self.cycle,
            containers = self.containers.len(),
            "container list refreshed"
        );
        Ok(self.containers.len())
    }

    /// Stats phase: one sequential fetch per known container. Failures only
    /// affect their own record. Checks `stop` between containers.
    pub async fn refresh_stats(
        &mut self,
        client: &DockerClient,
        stop: &watch::Receiver<bool>,
    ) -> StatsOutcome {
        let mut outcome = StatsOutcome::default();
        for id in self.containers.ids() {
            if *stop.borrow() {
                outcome.interrupted = true;
                break;
            }
            match client.container_stats(&id).await {
                Ok(stats) => {
                    self.record_stats(&id, stats);
                    outcome.succeeded += 1;
                }
                Err(e) => {
                    warn!(
                        container = %id,
                        error = %e,
                        operation = "container_stats",
                        "stats fetch failed; keeping previous values"
                    );
                    self.record_failure(&id);
                    outcome.failed += 1;
                }
            }
        }
        outcome
    }

    /// One full cycle: list phase, then stats phase.
    pub async fn refresh_cycle(
        &mut self,
        client: &DockerClient,
        stop: &watch::Receiver<bool>,
    ) -> CycleOutcome {
        if let Err(e) = self.refresh_list(client).await {
            return CycleOutcome::ListFailed(e);
        }
        if *stop.borrow() {
            return CycleOutcome::Interrupted;
        }
        let outcome = self.refresh_stats(client, stop).await;
        if outcome.interrupted {
            CycleOutcome::Interrupted
        } else {
            CycleOutcome::Completed(outcome)
        }
    }

    pub fn summary(&self) -> Summary {
        self.containers
            .iter()
            .filter(|r| r.is_running)
            .fold(
                Summary {
                    total: self.containers.len(),
                    ..Default::default()
                },
                |mut s, r| {
                    s.running += 1;
                    s.memory_usage = s.memory_usage.saturating_add(r.stats.memory_usage);
                    s.memory_limit = s.memory_limit.saturating_add(r.stats.memory_limit);
                    s
                },
            )
    }

    pub fn shutdown(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: &str, name: &str) -> ContainerDescriptor {
        ContainerDescriptor {
            id: id.into(),
            name: name.into(),
            image: "img".into(),
            status: "Up 1 minute".into(),
            created: 1,
            last_seen: 1,
        }
    }

    fn stats(cpu: u64, system: u64, usage: u64, limit: u64) -> ContainerStats {
        ContainerStats {
            cpu_usage: cpu,
            cpu_system_usage: system,
            memory_usage: usage,
            memory_limit: limit,
            timestamp: 1,
            ..Default::default()
        }
    }

    fn state() -> MonitorState {
        MonitorState::new(5, DaemonEndpoint::default())
    }

    #[test]
    fn memory_percent_half() {
        assert!((memory_percent(1_048_576, 2_097_152) - 50.0).abs() < 0.01);
    }

    #[test]
    fn memory_percent_zero_limit() {
        assert_eq!(memory_percent(1_048_576, 0), 0.0);
    }

    #[test]
    fn cpu_percent_needs_previous_sample() {
        assert_eq!(cpu_percent(None, &stats(500, 10_000, 0, 0)), 0.0);
    }

    #[test]
    fn cpu_percent_from_deltas() {
        let prev = CpuSample {
            total_usage: 50_000_000,
            system_usage: 500_000_000,
        };
        let mut cur = stats(100_000_000, 1_000_000_000, 0, 0);
        cur.online_cpus = 2;
        assert!((cpu_percent(Some(prev), &cur) - 20.0).abs() < 0.01);
    }

    #[test]
    fn cpu_percent_zero_when_counters_go_backwards() {
        let prev = CpuSample {
            total_usage: 100,
            system_usage: 1000,
        };
        assert_eq!(cpu_percent(Some(prev), &stats(50, 2000, 0, 0)), 0.0);
    }

    #[test]
    fn list_replaces_and_drops_stale() {
        let mut s = state();
        s.apply_container_list(vec![descriptor("a", "web"), descriptor("b", "db")]);
        assert_eq!(s.containers.len(), 2);
        s.apply_container_list(vec![descriptor("b", "db")]);
        assert_eq!(s.containers.ids(), ["b"]);
        assert_eq!(s.cycle, 2);
    }

    #[test]
    fn surviving_records_keep_stats() {
        let mut s = state();
        s.apply_container_list(vec![descriptor("a", "web")]);
        assert!(s.record_stats("a", stats(10, 100, 1024, 2048)));
        let mut renamed = descriptor("a", "web");
        renamed.status = "Up 2 minutes".into();
        s.apply_container_list(vec![renamed]);
        let r = s.containers.get("a").unwrap();
        assert_eq!(r.info.status, "Up 2 minutes");
        assert_eq!(r.stats.memory_usage, 1024);
        assert!(r.is_running);
    }

    #[test]
    fn success_sets_liveness_and_memory_percent() {
        let mut s = state();
        s.apply_container_list(vec![descriptor("a", "web")]);
        s.record_stats("a", stats(500, 10_000, 1_048_576, 2_097_152));
        let r = s.containers.get("a").unwrap();
        assert!(r.is_running);
        assert!((r.memory_percent - 50.0).abs() < 0.01);
        assert_eq!(r.cpu_percent, 0.0);
    }

    #[test]
    fn failure_keeps_previous_stats_and_only_affects_one_container() {
        let mut s = state();
        s.apply_container_list(vec![descriptor("a", "web"), descriptor("b", "db")]);
        s.record_stats("a", stats(500, 10_000, 1000, 4000));
        s.record_stats("b", stats(600, 10_000, 2000, 4000));

        s.record_failure("a");
        s.record_stats("b", stats(700, 20_000, 3000, 4000));

        let a = s.containers.get("a").unwrap();
        assert!(!a.is_running);
        assert_eq!(a.stats, stats(500, 10_000, 1000, 4000));
        assert!((a.memory_percent - 25.0).abs() < 0.01);

        let b = s.containers.get("b").unwrap();
        assert!(b.is_running);
        assert_eq!(b.stats.memory_usage, 3000);
        // (700-600)/(20000-10000) * 1 * 100
        assert!((b.cpu_percent - 1.0).abs() < 0.01);
    }

    #[test]
    fn unknown_id_is_ignored() {
        let mut s = state();
        assert!(!s.record_stats("ghost", ContainerStats::default()));
        assert!(!s.record_failure("ghost"));
    }

    #[test]
    fn capacity_overflow_truncates() {
        let mut set = ContainerSet::with_capacity(2);
        let dropped = set.replace_descriptors(vec![
            descriptor("a", "a"),
            descriptor("b", "b"),
            descriptor("c", "c"),
        ]);
        assert_eq!(dropped, 1);
        assert_eq!(set.ids(), ["a", "b"]);
    }

    #[test]
    fn filter_by_name_or_id_prefix() {
        let mut s = state().with_filter(Some("web".into()));
        s.apply_container_list(vec![descriptor("a1", "web"), descriptor("b2", "db")]);
        assert_eq!(s.containers.ids(), ["a1"]);

        let mut s = state().with_filter(Some("b2".into()));
        s.apply_container_list(vec![descriptor("a1", "web"), descriptor("b2ff", "db")]);
        assert_eq!(s.containers.ids(), ["b2ff"]);

        let s = state().with_filter(Some(String::new()));
        assert!(s.filter.is_none());
    }

    #[test]
    fn summary_counts_live_containers_only() {
        let mut s = state();
        s.apply_container_list(vec![descriptor("a", "web"), descriptor("b", "db")]);
        s.record_stats("a", stats(0, 0, 100, 1000));
        s.record_failure("b");
        assert_eq!(
            s.summary(),
            Summary {
                running: 1,
                total: 2,
                memory_usage: 100,
                memory_limit: 1000,
            }
        );
    }

    #[test]
    fn shutdown_clears_running() {
        let mut s = state();
        assert!(s.running);
        s.shutdown();
        assert!(!s.running);
    }
}
