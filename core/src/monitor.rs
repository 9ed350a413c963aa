// Monitor loop: poll → interpret → publish

use crate::source::{SourceConfig, StatusSource};
use crate::status::{interpret, render_report, ClusterSnapshot};
use crate::telemetry::MonitorStats;
use crate::transport::SnapshotPublisher;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, warn};

/// Monitor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub source: SourceConfig,
    pub poll_interval_ms: u64,
    /// Dashboard address snapshots are pushed to
    pub dashboard_addr: String,
    /// Bound for connecting to and writing to the dashboard
    pub publish_timeout_ms: u64,
    /// Log loop statistics every N cycles (0 disables)
    pub stats_every: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            poll_interval_ms: 1_000,
            dashboard_addr: "127.0.0.1:47777".to_string(),
            publish_timeout_ms: 250,
            stats_every: 60,
        }
    }
}

impl MonitorConfig {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            source: SourceConfig::from_env(),
            poll_interval_ms: std::env::var("LOGWATCH_POLL_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.poll_interval_ms),
            dashboard_addr: std::env::var("LOGWATCH_DASHBOARD_ADDR")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or(default.dashboard_addr),
            publish_timeout_ms: std::env::var("LOGWATCH_PUBLISH_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.publish_timeout_ms),
            stats_every: default.stats_every,
        }
    }
}

pub struct Monitor<S: StatusSource> {
    source: S,
    publisher: SnapshotPublisher,
    stats: MonitorStats,
}

impl<S: StatusSource> Monitor<S> {
    pub fn new(source: S, publisher: SnapshotPublisher) -> Self {
        Self {
            source,
            publisher,
            stats: MonitorStats::new(),
        }
    }

    pub fn stats(&self) -> &MonitorStats {
        &self.stats
    }

    /// Run one poll cycle. Only source and interpretation failures surface;
    /// publishing is best-effort.
    pub async fn poll_once(&mut self) -> Result<ClusterSnapshot> {
        let started = Instant::now();
        let outcome = self.cycle().await;
        self.stats.record_cycle(started.elapsed(), outcome.is_ok());
        outcome
    }

    async fn cycle(&mut self) -> Result<ClusterSnapshot> {
        let raw = self.source.fetch_status().await?;
        debug!(
            target: "monitor",
            leader = ?raw.leader_id,
            leader_commit = ?raw.commit_index(None),
            "Status fetched"
        );

        let leader_local = match raw.responsive_leader() {
            Some(leader) => match self.source.local_status(leader).await {
                Ok(local) => Some(local),
                Err(e) => {
                    warn!(target: "monitor", leader = %leader, error = %e, "Local status unavailable");
                    None
                }
            },
            None => None,
        };

        let snapshot = interpret(&raw, leader_local.as_ref())?;
        if !self.publisher.publish(&snapshot).await {
            self.stats.record_publish_failure();
        }
        Ok(snapshot)
    }

    /// Poll forever, printing a report per cycle.
    pub async fn run(mut self, poll_interval: Duration, stats_every: u64) {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match self.poll_once().await {
                Ok(snapshot) => {
                    println!("=== {} ===", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
                    print!("{}", render_report(&snapshot));
                }
                Err(e) => error!(target: "monitor", error = %e, "Poll cycle failed"),
            }
            if stats_every > 0 && self.stats.metrics().cycles % stats_every == 0 {
                self.stats.log_stats();
            }
        }
    }
}
