// Snapshot publisher
//
// Pushes encoded snapshots to the dashboard over a persistent TCP connection.
// Dashboard availability is best-effort: failures never reach the monitor.

use crate::dashboard::encode_line;
use crate::error::TransportError;
use crate::status::ClusterSnapshot;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info};

pub struct SnapshotPublisher {
    addr: String,
    timeout: Duration,
    stream: Option<TcpStream>,
}

impl SnapshotPublisher {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
            stream: None,
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Publish and swallow any failure. Returns whether the write succeeded.
    pub async fn publish(&mut self, snapshot: &ClusterSnapshot) -> bool {
        match self.try_publish(snapshot).await {
            Ok(()) => true,
            Err(e) => {
                debug!(target: "transport", addr = %self.addr, error = %e, "Snapshot not published");
                false
            }
        }
    }

    /// Publish, reporting the failure. A failed write drops the connection so
    /// the next call reconnects.
    pub async fn try_publish(&mut self, snapshot: &ClusterSnapshot) -> Result<(), TransportError> {
        let line = encode_line(snapshot)?;
        if self.stream.is_none() {
            self.connect().await?;
        }
        let Some(stream) = self.stream.as_mut() else {
            return Err(TransportError::NotConnected);
        };

        let result = match timeout(self.timeout, stream.write_all(line.as_bytes())).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(TransportError::Write(e)),
            Err(_) => Err(TransportError::Timeout(self.timeout.as_millis() as u64)),
        };
        if result.is_err() {
            self.stream = None;
        }
        result
    }

    async fn connect(&mut self) -> Result<(), TransportError> {
        let stream = match timeout(self.timeout, TcpStream::connect(&self.addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                return Err(TransportError::Connect {
                    addr: self.addr.clone(),
                    source,
                })
            }
            Err(_) => return Err(TransportError::Timeout(self.timeout.as_millis() as u64)),
        };
        stream.set_nodelay(true).map_err(TransportError::Write)?;
        info!(target: "transport", addr = %self.addr, "Connected to dashboard");
        self.stream = Some(stream);
        Ok(())
    }
}
