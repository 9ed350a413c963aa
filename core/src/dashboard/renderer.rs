// Chart renderer
//
// Owns the chart state and decides when the drawing surface must be reset.

use crate::error::RenderError;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, trace};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bar {
    pub label: String,
    pub value: u64,
}

/// Drawing backend for the renderer
pub trait ChartSurface {
    /// Wipe everything drawn so far.
    fn clear(&mut self) -> Result<(), RenderError>;

    /// Stage one frame of bars.
    fn draw_bars(&mut self, title: &str, bars: &[Bar]) -> Result<(), RenderError>;

    /// Make the staged frame visible.
    fn flush(&mut self) -> Result<(), RenderError>;
}

/// What is currently on the chart
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChartState {
    pub current_keys: BTreeSet<String>,
    pub current_values: Vec<(String, u64)>,
}

/// Compact label for a participant key: characters 5..11, clamped.
pub fn bar_label(key: &str) -> String {
    key.chars().skip(5).take(6).collect()
}

pub struct Renderer<S: ChartSurface> {
    surface: S,
    state: ChartState,
    frame_delay: Duration,
}

impl<S: ChartSurface> Renderer<S> {
    pub fn new(surface: S, frame_delay: Duration) -> Self {
        Self {
            surface,
            state: ChartState::default(),
            frame_delay,
        }
    }

    pub fn state(&self) -> &ChartState {
        &self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Draw one snapshot. The surface is cleared only when the participant
    /// set changed since the previous call.
    pub async fn render(&mut self, leader: &str, commits: &[(String, u64)]) -> Result<(), RenderError> {
        let new_keys: BTreeSet<String> = commits.iter().map(|(k, _)| k.clone()).collect();
        if new_keys != self.state.current_keys {
            debug!(
                target: "dashboard",
                before = self.state.current_keys.len(),
                after = new_keys.len(),
                "Participant set changed, resetting chart"
            );
            self.surface.clear()?;
            self.state.current_keys = new_keys;
        }
        self.state.current_values = commits.to_vec();

        // Leader highlighting is intentionally off: every bar is neutral
        let bars: Vec<Bar> = commits
            .iter()
            .map(|(key, value)| Bar {
                label: bar_label(key),
                value: *value,
            })
            .collect();
        trace!(target: "dashboard", leader = %leader, bars = bars.len(), "Drawing frame");

        let title = if leader.is_empty() {
            "commit index (no leader)".to_string()
        } else {
            format!("commit index (leader {})", leader)
        };
        self.surface.draw_bars(&title, &bars)?;
        if !self.frame_delay.is_zero() {
            tokio::time::sleep(self.frame_delay).await;
        }
        self.surface.flush()
    }
}
