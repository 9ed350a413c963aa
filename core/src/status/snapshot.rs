// Interpreted cluster views

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Leader,
    Follower,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Self::Leader => "leader",
            Self::Follower => "follower",
        }
    }
}

/// Display classification of one participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Normal,
    LeaderRecovering,
    ConnectionError,
}

/// Which side supplied a participant's indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// The leader's follower view (participant unreachable from here)
    Leader,
    /// The participant's own response
    Server,
}

impl DataSource {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Leader => "(from leader)",
            Self::Server => "(from server)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantView {
    pub id: String,
    pub role: Role,
    pub has_connection_error: bool,
    pub commit_index: u64,
    pub spearhead_index: Option<u64>,
    pub spearhead_term: Option<u64>,
    pub state_message: String,
    pub classification: Classification,
    pub source: DataSource,
    /// `F`/`Q`/`L` flags, only for participants with a connection error
    pub flags: Option<String>,
}

impl ParticipantView {
    /// Multi-line, colour-free description of this participant.
    pub fn describe(&self) -> String {
        let flags = self
            .flags
            .as_deref()
            .map(|f| format!(" [{}]", f))
            .unwrap_or_default();
        let recovery = if self.classification == Classification::LeaderRecovering {
            " | RecoveryInProgress"
        } else {
            ""
        };
        format!(
            "{} {}{}\n  {} spearhead={} | commit={} | term={}\n  state: {}{}",
            self.id,
            self.role.label(),
            flags,
            self.source.tag(),
            opt(self.spearhead_index),
            self.commit_index,
            opt(self.spearhead_term),
            self.state_message,
            recovery,
        )
    }
}

fn opt(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emphasis {
    Plain,
    Highlight,
    Participant(Classification),
}

/// One entry of the human-readable report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticLine {
    pub emphasis: Emphasis,
    pub text: String,
}

impl DiagnosticLine {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            emphasis: Emphasis::Plain,
            text: text.into(),
        }
    }

    pub fn highlight(text: impl Into<String>) -> Self {
        Self {
            emphasis: Emphasis::Highlight,
            text: text.into(),
        }
    }
}

impl fmt::Display for DiagnosticLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// One interpreted poll cycle. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSnapshot {
    leader_id: Option<String>,
    commits: BTreeMap<String, u64>,
    participants: Vec<ParticipantView>,
    diagnostic_lines: Vec<DiagnosticLine>,
}

impl ClusterSnapshot {
    /// Snapshot of a cluster with a responsive leader. Views are sorted by id.
    pub fn from_views(leader_id: Option<String>, mut views: Vec<ParticipantView>) -> Self {
        views.sort_by(|a, b| a.id.cmp(&b.id));
        let commits = views
            .iter()
            .map(|v| (v.id.clone(), v.commit_index))
            .collect();
        let diagnostic_lines = views
            .iter()
            .map(|v| DiagnosticLine {
                emphasis: Emphasis::Participant(v.classification),
                text: v.describe(),
            })
            .collect();
        Self {
            leader_id,
            commits,
            participants: views,
            diagnostic_lines,
        }
    }

    /// Snapshot without commit data, only supervision diagnostics.
    pub fn supervised(diagnostic_lines: Vec<DiagnosticLine>) -> Self {
        Self {
            leader_id: None,
            commits: BTreeMap::new(),
            participants: Vec::new(),
            diagnostic_lines,
        }
    }

    pub fn leader_id(&self) -> Option<&str> {
        self.leader_id.as_deref()
    }

    pub fn commits(&self) -> &BTreeMap<String, u64> {
        &self.commits
    }

    pub fn participants(&self) -> &[ParticipantView] {
        &self.participants
    }

    pub fn diagnostic_lines(&self) -> &[DiagnosticLine] {
        &self.diagnostic_lines
    }
}
