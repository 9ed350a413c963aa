// Status module - cluster status interpretation
//
// Raw API documents in, immutable snapshots and console reports out.

mod interpreter;
pub mod raw;
mod report;
mod snapshot;

pub use interpreter::{interpret, CONTACT_PENDING, RECOVERY_IN_PROGRESS};
pub use raw::{LocalStatus, RawStatus};
pub use report::{render_report, RULE_WIDTH};
pub use snapshot::{
    Classification, ClusterSnapshot, DataSource, DiagnosticLine, Emphasis, ParticipantView, Role,
};
