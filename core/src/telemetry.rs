// Logging and poll-cycle statistics
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `default_filter`. Output goes to stderr so that
/// stdout stays free for reports and the terminal chart.
pub fn init_logging(default_filter: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .try_init()?;
    Ok(())
}

/// Monitor loop counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleMetrics {
    pub cycles: u64,
    pub failed_cycles: u64,
    pub failed_publishes: u64,
    pub last_cycle_ms: f64,
    pub avg_cycle_ms: f64,
}

/// Collects CycleMetrics for the monitor loop
#[derive(Debug)]
pub struct MonitorStats {
    metrics: CycleMetrics,
    total: Duration,
    started: Instant,
}

impl MonitorStats {
    pub fn new() -> Self {
        Self {
            metrics: CycleMetrics::default(),
            total: Duration::ZERO,
            started: Instant::now(),
        }
    }

    /// Record a finished cycle
    pub fn record_cycle(&mut self, latency: Duration, ok: bool) {
        self.metrics.cycles += 1;
        if !ok {
            self.metrics.failed_cycles += 1;
        }
        self.total += latency;
        self.metrics.last_cycle_ms = latency.as_secs_f64() * 1000.0;
        self.metrics.avg_cycle_ms =
            self.total.as_secs_f64() * 1000.0 / self.metrics.cycles as f64;
    }

    pub fn record_publish_failure(&mut self) {
        self.metrics.failed_publishes += 1;
    }

    pub fn metrics(&self) -> &CycleMetrics {
        &self.metrics
    }

    /// Print metrics to log
    pub fn log_stats(&self) {
        let m = &self.metrics;
        info!(
            target: "monitor",
            uptime_s = self.started.elapsed().as_secs(),
            cycles = m.cycles,
            failed_cycles = m.failed_cycles,
            failed_publishes = m.failed_publishes,
            last_cycle_ms = m.last_cycle_ms,
            avg_cycle_ms = m.avg_cycle_ms,
            "Monitor stats"
        );
    }
}

impl Default for MonitorStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_cycle_latency() {
        let mut stats = MonitorStats::new();
        stats.record_cycle(Duration::from_millis(10), true);
        stats.record_cycle(Duration::from_millis(30), false);
        stats.record_publish_failure();

        let m = stats.metrics();
        assert_eq!(m.cycles, 2);
        assert_eq!(m.failed_cycles, 1);
        assert_eq!(m.failed_publishes, 1);
        assert!((m.avg_cycle_ms - 20.0).abs() < 0.5);
        assert!((m.last_cycle_ms - 30.0).abs() < 0.5);
    }
}
