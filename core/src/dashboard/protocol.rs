// Dashboard wire protocol
//
// One JSON object per line: {"leader": "<id>", "commit": {"<id>": <index>, ...}}

use crate::error::{DecodeError, TransportError};
use crate::status::ClusterSnapshot;
use serde::{Deserialize, Serialize};

/// Message carried from the monitor to the dashboard
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMessage {
    /// Leader id, empty when the cluster has no responsive leader
    pub leader: String,
    /// Commit index per participant, in wire order
    #[serde(with = "crate::ordered")]
    pub commit: Vec<(String, u64)>,
}

impl From<&ClusterSnapshot> for SnapshotMessage {
    fn from(snapshot: &ClusterSnapshot) -> Self {
        Self {
            leader: snapshot.leader_id().unwrap_or_default().to_string(),
            commit: snapshot
                .commits()
                .iter()
                .map(|(id, index)| (id.clone(), *index))
                .collect(),
        }
    }
}

/// Encode a snapshot as one newline-terminated message.
pub fn encode_line(snapshot: &ClusterSnapshot) -> Result<String, TransportError> {
    let mut line = serde_json::to_string(&SnapshotMessage::from(snapshot))?;
    line.push('\n');
    Ok(line)
}

/// Decode one raw frame as read off the socket.
pub fn decode_frame(frame: &[u8]) -> Result<SnapshotMessage, DecodeError> {
    decode_line(std::str::from_utf8(frame)?)
}

/// Decode one message (trailing whitespace tolerated).
pub fn decode_line(line: &str) -> Result<SnapshotMessage, DecodeError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(serde_json::from_str(trimmed)?)
}
