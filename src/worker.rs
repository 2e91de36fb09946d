// Refresh loop: list phase, stats phase, then sleep for the interval.
// The sleep starts after both phases, so the period drifts by their duration.

use crate::docker_client::DockerClient;
use crate::monitor::{CycleOutcome, MonitorState};
use tokio::sync::watch;
use tracing::Instrument;

/// Runs cycles until `shutdown` flips to true (or its sender is dropped).
/// `on_cycle` sees the state after every cycle whose list phase succeeded.
pub async fn run<F>(
    client: &DockerClient,
    state: &mut MonitorState,
    shutdown: watch::Receiver<bool>,
    on_cycle: F,
) where
    F: FnMut(&MonitorState),
{
    let worker_span = tracing::span!(
        tracing::Level::DEBUG,
        "worker",
        interval_secs = state.interval_secs
    );
    run_cycles(client, state, shutdown, on_cycle)
        .instrument(worker_span)
        .await;

    state.shutdown();
    tracing::debug!("Worker shutting down");
}

async fn run_cycles<F>(
    client: &DockerClient,
    state: &mut MonitorState,
    mut shutdown: watch::Receiver<bool>,
    mut on_cycle: F,
) where
    F: FnMut(&MonitorState),
{
    loop {
        if *shutdown.borrow() {
            return;
        }

        match state.refresh_cycle(client, &shutdown).await {
            CycleOutcome::Completed(outcome) => {
                tracing::debug!(
                    cycle = state.cycle,
                    live = outcome.succeeded,
                    failed = outcome.failed,
                    "cycle complete"
                );
                on_cycle(state);
            }
            CycleOutcome::ListFailed(e) => {
                tracing::warn!(
                    error = %e,
                    operation = "list_containers",
                    "container list failed; skipping stats this cycle"
                );
            }
            CycleOutcome::Interrupted => {
                tracing::debug!("cycle interrupted by shutdown");
                return;
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(state.interval()) => {}
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return;
                }
            }
        }
    }
}
