use std::time::Duration;

use logwatch::LogwatchConfig;
use logwatch_core::telemetry::init_logging;
use logwatch_core::{query_commit_index, HttpStatusSource, Monitor, SnapshotPublisher};
use tokio::signal;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let _ = dotenvy::dotenv();

    // Configuration (defaults + env + optional TOML overlay), then logging
    let cfg = LogwatchConfig::load();
    init_logging(&cfg.log_filter)?;

    let monitor_cfg = cfg.monitor;
    info!(
        target: "logwatch",
        coordinator = %monitor_cfg.source.coordinator_url,
        log_id = monitor_cfg.source.log_id,
        dashboard = %monitor_cfg.dashboard_addr,
        "Starting replicated log monitor"
    );

    let source = HttpStatusSource::new(monitor_cfg.source.clone());

    // `logwatch-monitor commit-index [server]` prints one value and exits
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("commit-index") {
        let index = query_commit_index(&source, args.get(1).map(String::as_str)).await?;
        println!("{}", index);
        return Ok(());
    }

    let publisher = SnapshotPublisher::new(
        monitor_cfg.dashboard_addr.clone(),
        Duration::from_millis(monitor_cfg.publish_timeout_ms),
    );
    let monitor = Monitor::new(source, publisher);

    tokio::select! {
        _ = monitor.run(
            Duration::from_millis(monitor_cfg.poll_interval_ms.max(1)),
            monitor_cfg.stats_every,
        ) => {}
        _ = signal::ctrl_c() => {
            info!(target: "logwatch", "Interrupted, shutting down monitor");
        }
    }
    Ok(())
}
