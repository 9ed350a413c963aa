// Raw cluster status documents
//
// Mirrors the replicated log status API. Every path is optional; the
// interpreter decides what is required.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Status of one replicated log as reported by the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStatus {
    pub leader_id: Option<String>,
    /// Keyed by participant id, iterated in ascending order
    pub participants: Option<BTreeMap<String, ParticipantStatus>>,
    pub supervision: Option<SupervisionStatus>,
    pub specification: Option<Specification>,
}

impl RawStatus {
    /// Leader id, if a leader is named and it answered the coordinator.
    pub fn responsive_leader(&self) -> Option<&str> {
        let id = self.leader_id.as_deref().filter(|id| !id.is_empty())?;
        let leader = self.participants.as_ref()?.get(id)?;
        if leader.has_connection_error() || leader.response.is_none() {
            return None;
        }
        Some(id)
    }

    /// Leader's commit index, or with `server` set, that follower's
    /// spearhead index as seen by the leader.
    pub fn commit_index(&self, server: Option<&str>) -> Option<u64> {
        let leader_id = self.leader_id.as_deref()?;
        let leader = self.participants.as_ref()?.get(leader_id)?.response.as_ref()?;
        match server {
            None => leader.local.as_ref()?.commit_index,
            Some(id) => leader.follower.as_ref()?.get(id)?.spearhead?.index,
        }
    }

    pub fn plan_term(&self) -> Option<u64> {
        self.specification
            .as_ref()?
            .plan
            .as_ref()?
            .current_term
            .as_ref()?
            .term
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantStatus {
    pub connection: Option<ConnectionStatus>,
    pub response: Option<ParticipantResponse>,
}

impl ParticipantStatus {
    pub fn has_connection_error(&self) -> bool {
        self.connection
            .as_ref()
            .and_then(|c| c.error_code)
            .is_some_and(|code| code != 0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub error_code: Option<i64>,
    pub error_message: Option<String>,
}

/// A participant's own answer. Leaders additionally report their view of
/// every follower.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantResponse {
    pub role: Option<String>,
    pub local: Option<LocalState>,
    pub follower: Option<BTreeMap<String, FollowerStatus>>,
    pub last_commit_status: Option<CommitStatus>,
    pub active_participants_config: Option<BTreeMap<String, ParticipantFlags>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalState {
    pub spearhead: Option<TermIndex>,
    pub commit_index: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermIndex {
    pub term: Option<u64>,
    pub index: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowerStatus {
    pub spearhead: Option<TermIndex>,
    pub commit_index: Option<u64>,
    pub last_error_reason: Option<ErrorReason>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorReason {
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitStatus {
    /// Usually a string, some server versions send an object
    pub reason: Option<Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantFlags {
    #[serde(default)]
    pub forced: bool,
    #[serde(default)]
    pub allowed_in_quorum: bool,
    #[serde(default)]
    pub allowed_as_leader: bool,
}

impl ParticipantFlags {
    /// Three-character rendering, e.g. `F-L`.
    pub fn short(&self) -> String {
        [
            if self.forced { 'F' } else { '-' },
            if self.allowed_in_quorum { 'Q' } else { '-' },
            if self.allowed_as_leader { 'L' } else { '-' },
        ]
        .iter()
        .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupervisionStatus {
    pub response: Option<SupervisionResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupervisionResponse {
    pub election: Option<Election>,
    #[serde(rename = "StatusMessage")]
    pub status_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Election {
    pub term: Option<u64>,
    /// Per-participant election messages, in document order
    #[serde(default, with = "crate::ordered")]
    pub details: Vec<(String, Value)>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Specification {
    pub plan: Option<Plan>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub current_term: Option<CurrentTerm>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentTerm {
    pub term: Option<u64>,
}

/// Reply of a server's local-status endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalStatus {
    pub manager_state: Option<String>,
}

/// Renders a loosely typed status field for display.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("message") {
            Some(Value::String(s)) => s.clone(),
            _ => value.to_string(),
        },
        other => other.to_string(),
    }
}
