// Status interpreter
//
// Turns one RawStatus into a ClusterSnapshot. Pure: the leader's local status
// is looked up by the caller and passed in.

use super::raw::{display_value, LocalStatus, ParticipantResponse, ParticipantStatus, RawStatus};
use super::snapshot::{
    Classification, ClusterSnapshot, DataSource, DiagnosticLine, ParticipantView, Role,
};
use crate::error::StatusError;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Shown when supervision data is missing or stale.
pub const CONTACT_PENDING: &str = "contact pending";

/// Manager state reported by a leader that is still recovering its log.
pub const RECOVERY_IN_PROGRESS: &str = "RecoveryInProgress";

/// Interpret one raw status document.
///
/// Fails only when `participants` is missing. A missing or unreachable leader
/// is not an error: the snapshot then carries supervision diagnostics and no
/// commit indices.
pub fn interpret(
    raw: &RawStatus,
    leader_local: Option<&LocalStatus>,
) -> Result<ClusterSnapshot, StatusError> {
    let participants = raw
        .participants
        .as_ref()
        .ok_or_else(|| StatusError::Malformed("missing `participants`".to_string()))?;

    match raw.responsive_leader() {
        Some(leader_id) => Ok(leader_case(leader_id, participants, leader_local)),
        None => Ok(supervision_case(raw)),
    }
}

fn leader_case(
    leader_id: &str,
    participants: &BTreeMap<String, ParticipantStatus>,
    leader_local: Option<&LocalStatus>,
) -> ClusterSnapshot {
    let leader_response = participants.get(leader_id).and_then(|p| p.response.as_ref());
    let recovering = leader_local
        .and_then(|l| l.manager_state.as_deref())
        .is_some_and(|state| state == RECOVERY_IN_PROGRESS);

    let mut views = Vec::with_capacity(participants.len());
    for (id, participant) in participants {
        let is_leader = id == leader_id;
        let view = if !is_leader && participant.has_connection_error() {
            view_from_leader(id, leader_response)
        } else {
            view_from_server(id, is_leader, participant, recovering)
        };
        match view {
            Some(view) => views.push(view),
            None => warn!(
                target: "interpreter",
                participant = %id,
                "No commit index derivable; participant left out of snapshot"
            ),
        }
    }

    debug!(
        target: "interpreter",
        leader = %leader_id,
        participants = views.len(),
        recovering,
        "Interpreted leader status"
    );
    ClusterSnapshot::from_views(Some(leader_id.to_string()), views)
}

/// Follower the monitor cannot reach: use what the leader knows about it.
fn view_from_leader(id: &str, leader: Option<&ParticipantResponse>) -> Option<ParticipantView> {
    let leader = leader?;
    let follower = leader.follower.as_ref()?.get(id)?;
    let commit_index = follower.commit_index?;
    let spearhead = follower.spearhead.unwrap_or_default();

    let state_message = match follower
        .last_error_reason
        .as_ref()
        .and_then(|r| r.error.as_deref())
    {
        Some("None") => "OK".to_string(),
        Some(error) => error.to_string(),
        None => "unknown".to_string(),
    };

    let flags = leader
        .active_participants_config
        .as_ref()
        .and_then(|config| config.get(id))
        .map(|f| f.short())
        .unwrap_or_else(|| "---".to_string());

    Some(ParticipantView {
        id: id.to_string(),
        role: Role::Follower,
        has_connection_error: true,
        commit_index,
        spearhead_index: spearhead.index,
        spearhead_term: spearhead.term,
        state_message,
        classification: Classification::ConnectionError,
        source: DataSource::Leader,
        flags: Some(flags),
    })
}

fn view_from_server(
    id: &str,
    is_leader: bool,
    participant: &ParticipantStatus,
    recovering: bool,
) -> Option<ParticipantView> {
    let response = participant.response.as_ref()?;
    let local = response.local.as_ref()?;
    let commit_index = local.commit_index?;
    let spearhead = local.spearhead.unwrap_or_default();

    let (role, state_message, classification) = if is_leader {
        let reason = response
            .last_commit_status
            .as_ref()
            .and_then(|s| s.reason.as_ref())
            .map(display_value)
            .unwrap_or_else(|| "-".to_string());
        let classification = if recovering {
            Classification::LeaderRecovering
        } else {
            Classification::Normal
        };
        (Role::Leader, reason, classification)
    } else {
        (Role::Follower, "OK".to_string(), Classification::Normal)
    };

    Some(ParticipantView {
        id: id.to_string(),
        role,
        has_connection_error: false,
        commit_index,
        spearhead_index: spearhead.index,
        spearhead_term: spearhead.term,
        state_message,
        classification,
        source: DataSource::Server,
        flags: None,
    })
}

fn supervision_case(raw: &RawStatus) -> ClusterSnapshot {
    let pending = || ClusterSnapshot::supervised(vec![DiagnosticLine::plain(CONTACT_PENDING)]);

    let Some(response) = raw.supervision.as_ref().and_then(|s| s.response.as_ref()) else {
        return pending();
    };
    let Some(election) = response.election.as_ref() else {
        return pending();
    };
    // Without an election term there is nothing to check freshness against
    let Some(election_term) = election.term else {
        return pending();
    };
    if let Some(plan_term) = raw.plan_term() {
        if election_term < plan_term {
            debug!(
                target: "interpreter",
                election_term,
                plan_term,
                "Ignoring stale supervision election"
            );
            return pending();
        }
    }

    let mut lines = Vec::with_capacity(election.details.len() + 1);
    if let Some(message) = &response.status_message {
        lines.push(DiagnosticLine::highlight(message.clone()));
    }
    for (participant, detail) in &election.details {
        lines.push(DiagnosticLine::plain(format!(
            "{}: {}",
            participant,
            display_value(detail)
        )));
    }
    ClusterSnapshot::supervised(lines)
}
