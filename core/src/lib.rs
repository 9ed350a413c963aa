// Logwatch Core Library
// Replicated log health interpretation and live commit dashboard

pub mod dashboard;
pub mod error;
pub mod monitor;
mod ordered;
pub mod source;
pub mod status;
pub mod telemetry;
pub mod transport;

// Export core types
pub use dashboard::{DashboardConfig, DashboardServer, Renderer};
pub use error::{DecodeError, RenderError, SourceError, StatusError, TransportError};
pub use monitor::{Monitor, MonitorConfig};
pub use source::{query_commit_index, HttpStatusSource, SourceConfig, StatusSource};
pub use status::{interpret, ClusterSnapshot, RawStatus};
pub use transport::SnapshotPublisher;

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogwatchError {
    #[error("Status error: {0}")]
    Status(#[from] StatusError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
pub type Result<T> = std::result::Result<T, LogwatchError>;
