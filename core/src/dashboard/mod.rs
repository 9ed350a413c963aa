// Dashboard module - live commit index bar chart
//
// A single-connection TCP server receives snapshot messages from the monitor
// and redraws a bar chart per message.

mod protocol;
mod renderer;
mod server;
mod terminal;

pub use protocol::{decode_frame, decode_line, encode_line, SnapshotMessage};
pub use renderer::{bar_label, Bar, ChartState, ChartSurface, Renderer};
pub use server::DashboardServer;
pub use terminal::{LogSurface, TerminalSurface};

use serde::{Deserialize, Serialize};

/// Dashboard configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub port: u16,
    pub host: String,
    /// Pause between drawing and flushing a frame
    pub frame_delay_ms: u64,
    /// Log bars instead of drawing to the terminal
    pub headless: bool,
    /// Longest accepted message, newline included
    pub max_frame_bytes: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            port: 47777,
            host: "127.0.0.1".to_string(),
            frame_delay_ms: 500,
            headless: false,
            max_frame_bytes: 64 * 1024,
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            port: std::env::var("LOGWATCH_DASHBOARD_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(default.port),
            host: std::env::var("LOGWATCH_DASHBOARD_HOST").unwrap_or(default.host),
            frame_delay_ms: std::env::var("LOGWATCH_FRAME_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.frame_delay_ms),
            headless: std::env::var("LOGWATCH_HEADLESS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.headless),
            max_frame_bytes: std::env::var("LOGWATCH_MAX_FRAME_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(default.max_frame_bytes),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
