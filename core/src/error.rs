use thiserror::Error;

/// Raw status document is missing structure the interpreter cannot do without.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    #[error("Malformed status: {0}")]
    Malformed(String),
}

/// Publish-side failures. Always contained by the publisher's caller.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Not connected to dashboard")]
    NotConnected,

    #[error("Connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Write failed: {0}")]
    Write(#[source] std::io::Error),

    #[error("Timed out after {0}ms")]
    Timeout(u64),

    #[error("Encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Dashboard received a line it could not parse.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Empty message")]
    Empty,

    #[error("Invalid snapshot message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Message is not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Message of {len} bytes exceeds the {limit} byte limit")]
    Oversized { len: usize, limit: usize },
}

/// Drawing failed. Logged by the dashboard server, never fatal.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    #[error("Surface error: {0}")]
    Surface(String),
}

/// Cluster status source failures.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected payload: {0}")]
    Payload(String),
}
