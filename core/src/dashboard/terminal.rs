// Chart surfaces: ratatui terminal bar chart, and a headless logger

use super::renderer::{Bar, ChartSurface};
use crate::error::RenderError;
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Color, Style};
use ratatui::widgets::{BarChart, Block, Borders};
use ratatui::Terminal;
use std::io::{self, Stdout};
use tracing::info;

/// Bar chart drawn on the process terminal (alternate screen).
pub struct TerminalSurface {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pending: Option<(String, Vec<Bar>)>,
}

impl TerminalSurface {
    pub fn new() -> Result<Self, RenderError> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self {
            terminal,
            pending: None,
        })
    }
}

impl ChartSurface for TerminalSurface {
    fn clear(&mut self) -> Result<(), RenderError> {
        self.terminal.clear()?;
        Ok(())
    }

    fn draw_bars(&mut self, title: &str, bars: &[Bar]) -> Result<(), RenderError> {
        self.pending = Some((title.to_string(), bars.to_vec()));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), RenderError> {
        let Some((title, bars)) = self.pending.take() else {
            return Ok(());
        };
        let data: Vec<(&str, u64)> = bars.iter().map(|b| (b.label.as_str(), b.value)).collect();
        self.terminal.draw(|frame| {
            let chart = BarChart::default()
                .block(Block::default().title(title.as_str()).borders(Borders::ALL))
                .data(data.as_slice())
                .bar_width(8)
                .bar_gap(2)
                .bar_style(Style::default().fg(Color::Gray))
                .value_style(Style::default().fg(Color::Black).bg(Color::Gray));
            frame.render_widget(chart, frame.size());
        })?;
        Ok(())
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Surface for machines without a terminal: every frame goes to the log.
#[derive(Debug, Default)]
pub struct LogSurface {
    frames: u64,
    pending: Option<String>,
}

impl LogSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl ChartSurface for LogSurface {
    fn clear(&mut self) -> Result<(), RenderError> {
        info!(target: "dashboard", "Chart cleared");
        Ok(())
    }

    fn draw_bars(&mut self, title: &str, bars: &[Bar]) -> Result<(), RenderError> {
        let rendered: Vec<String> = bars
            .iter()
            .map(|b| format!("{}={}", b.label, b.value))
            .collect();
        self.pending = Some(format!("{}: {}", title, rendered.join(" ")));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), RenderError> {
        if let Some(frame) = self.pending.take() {
            self.frames += 1;
            info!(target: "dashboard", frame = self.frames, "{}", frame);
        }
        Ok(())
    }
}
