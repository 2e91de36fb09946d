use anyhow::Result;
use clap::Parser;
use docker_monitor::*;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();
    let app_config = config::AppConfig::load(&args)?;
    let format = app_config.output.format;

    let client = docker_client::DockerClient::new(app_config.endpoint());
    let mut state = monitor::MonitorState::new(
        app_config.monitoring.interval_secs,
        client.endpoint().clone(),
    )
    .with_filter(app_config.container_filter());

    if format != render::OutputFormat::Json {
        print!("{}", render::banner(&state));
    }

    client
        .probe()
        .await
        .map_err(|e| anyhow::anyhow!("docker daemon unreachable: {}", e))?;
    tracing::info!(
        endpoint = %client.endpoint(),
        version = version::VERSION,
        "Connected to docker daemon"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!("Received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    worker::run(&client, &mut state, shutdown_rx, |state| {
        match render::render(state, format) {
            Ok(out) => println!("{}", out),
            Err(e) => tracing::warn!(error = %e, operation = "render", "render failed"),
        }
    })
    .await;

    tracing::info!("Shutting down");
    Ok(())
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
