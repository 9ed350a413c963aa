// Console report for one snapshot

use super::snapshot::{Classification, ClusterSnapshot, DiagnosticLine, Emphasis};
use crossterm::style::{StyledContent, Stylize};

/// Width of the rule printed between participant blocks.
pub const RULE_WIDTH: usize = 56;

/// Render the snapshot's diagnostic lines with terminal colours.
pub fn render_report(snapshot: &ClusterSnapshot) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let mut out = String::new();
    for (i, line) in snapshot.diagnostic_lines().iter().enumerate() {
        if i > 0 && matches!(line.emphasis, Emphasis::Participant(_)) {
            out.push_str(&rule);
            out.push('\n');
        }
        out.push_str(&render_line(line));
        out.push('\n');
    }
    out
}

fn render_line(line: &DiagnosticLine) -> String {
    match line.emphasis {
        Emphasis::Plain => line.text.clone(),
        Emphasis::Highlight => line.text.as_str().red().bold().to_string(),
        Emphasis::Participant(class) => match line.text.split_once(' ') {
            Some((id, rest)) => format!("{} {}", paint(id, class), rest),
            None => paint(&line.text, class).to_string(),
        },
    }
}

fn paint(id: &str, class: Classification) -> StyledContent<&str> {
    match class {
        Classification::Normal => id.green(),
        Classification::LeaderRecovering => id.yellow(),
        Classification::ConnectionError => id.red(),
    }
}
