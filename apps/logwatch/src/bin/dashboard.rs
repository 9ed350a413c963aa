use std::time::Duration;

use logwatch::LogwatchConfig;
use logwatch_core::dashboard::{ChartSurface, LogSurface, TerminalSurface};
use logwatch_core::telemetry::init_logging;
use logwatch_core::{DashboardConfig, DashboardServer, Renderer};
use tokio::signal;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let _ = dotenvy::dotenv();

    let cfg = LogwatchConfig::load();
    init_logging(&cfg.log_filter)?;

    let dashboard = cfg.dashboard;
    info!(
        target: "logwatch",
        addr = %dashboard.addr(),
        headless = dashboard.headless,
        "Starting commit dashboard"
    );

    if dashboard.headless {
        run(&dashboard, LogSurface::new()).await
    } else {
        run(&dashboard, TerminalSurface::new()?).await
    }
}

async fn run<S: ChartSurface>(
    config: &DashboardConfig,
    surface: S,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let renderer = Renderer::new(surface, Duration::from_millis(config.frame_delay_ms));
    let server = DashboardServer::bind(config, renderer).await?;

    // Dropping the server on interrupt restores the terminal
    tokio::select! {
        _ = server.serve() => {}
        _ = signal::ctrl_c() => {
            info!(target: "logwatch", "Interrupted, shutting down dashboard");
        }
    }
    Ok(())
}
