use std::fs;
use std::path::Path;

use logwatch_core::{DashboardConfig, MonitorConfig};

/// Configuration shared by the monitor and dashboard binaries
#[derive(Clone, Debug, PartialEq)]
pub struct LogwatchConfig {
    pub monitor: MonitorConfig,
    pub dashboard: DashboardConfig,
    /// Default tracing filter when RUST_LOG is unset
    pub log_filter: String,
}

impl Default for LogwatchConfig {
    fn default() -> Self {
        // Feature defaults already consider env vars
        Self {
            monitor: MonitorConfig::from_env(),
            dashboard: DashboardConfig::from_env(),
            log_filter: "info,logwatch_core=info,logwatch=info".to_string(),
        }
    }
}

impl LogwatchConfig {
    /// Load configuration from a TOML file (path via LOGWATCH_CONFIG or ./logwatch.toml),
    /// overlaying values onto defaults and env-driven defaults.
    pub fn load() -> Self {
        let path = std::env::var("LOGWATCH_CONFIG").unwrap_or_else(|_| "logwatch.toml".into());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> Self {
        let default = Self::default();
        if !path.exists() {
            tracing::info!(target: "logwatch", path = %path.display(), "No TOML config found; using defaults/env");
            return default;
        }
        match fs::read_to_string(path) {
            Ok(s) => match Self::overlay_str(&s, default.clone()) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!(target: "logwatch", error = %e, "Failed to parse TOML; using defaults");
                    default
                }
            },
            Err(e) => {
                tracing::warn!(target: "logwatch", error = %e, "Failed to read TOML; using defaults");
                default
            }
        }
    }

    /// Apply a TOML document on top of `base`.
    pub fn overlay_str(s: &str, base: Self) -> Result<Self, toml::de::Error> {
        let t: LogwatchToml = toml::from_str(s)?;
        Ok(t.overlay(base))
    }
}

// =========================
// TOML overlay definitions
// =========================

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct LogwatchToml {
    pub log_filter: Option<String>,
    pub monitor: Option<MonitorToml>,
    pub dashboard: Option<DashboardToml>,
}

impl LogwatchToml {
    fn overlay(self, mut base: LogwatchConfig) -> LogwatchConfig {
        if let Some(f) = self.log_filter {
            base.log_filter = f;
        }
        if let Some(m) = self.monitor {
            m.apply(&mut base.monitor);
        }
        if let Some(d) = self.dashboard {
            d.apply(&mut base.dashboard);
        }
        base
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct MonitorToml {
    pub coordinator_url: Option<String>,
    pub log_id: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub dashboard_addr: Option<String>,
    pub publish_timeout_ms: Option<u64>,
    pub stats_every: Option<u64>,
}
impl MonitorToml {
    fn apply(self, m: &mut MonitorConfig) {
        if let Some(x) = self.coordinator_url {
            m.source.coordinator_url = x;
        }
        if let Some(x) = self.log_id {
            m.source.log_id = x;
        }
        if let Some(x) = self.request_timeout_ms {
            m.source.timeout_ms = x;
        }
        if let Some(x) = self.poll_interval_ms {
            // tokio::time::interval panics on zero
            m.poll_interval_ms = x.max(1);
        }
        if let Some(x) = self.dashboard_addr {
            m.dashboard_addr = x;
        }
        if let Some(x) = self.publish_timeout_ms {
            m.publish_timeout_ms = x;
        }
        if let Some(x) = self.stats_every {
            m.stats_every = x;
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct DashboardToml {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub frame_delay_ms: Option<u64>,
    pub headless: Option<bool>,
    pub max_frame_bytes: Option<usize>,
}
impl DashboardToml {
    fn apply(self, d: &mut DashboardConfig) {
        if let Some(x) = self.host {
            d.host = x;
        }
        if let Some(x) = self.port {
            d.port = x;
        }
        if let Some(x) = self.frame_delay_ms {
            d.frame_delay_ms = x;
        }
        if let Some(x) = self.headless {
            d.headless = x;
        }
        if let Some(x) = self.max_frame_bytes {
            d.max_frame_bytes = x.max(1);
        }
    }
}
