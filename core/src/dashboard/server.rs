// Dashboard TCP server
//
// Serves one publisher at a time: accept, read newline-framed snapshot
// messages until the peer closes, accept again. Frames are read as raw
// bytes under a length cap; only socket errors end a connection.

use crate::dashboard::protocol::decode_frame;
use crate::dashboard::renderer::{ChartSurface, Renderer};
use crate::dashboard::DashboardConfig;
use crate::error::DecodeError;
use std::io;
use std::net::SocketAddr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

/// Dashboard server bound to its listen address
pub struct DashboardServer<S: ChartSurface> {
    listener: TcpListener,
    renderer: Renderer<S>,
    max_frame_bytes: usize,
}

impl<S: ChartSurface> DashboardServer<S> {
    pub async fn bind(config: &DashboardConfig, renderer: Renderer<S>) -> io::Result<Self> {
        let addr = config.addr();
        let listener = TcpListener::bind(&addr).await?;
        info!(
            target: "dashboard",
            addr = %listener.local_addr()?,
            max_frame_bytes = config.max_frame_bytes,
            "Dashboard server listening"
        );
        Ok(Self {
            listener,
            renderer,
            max_frame_bytes: config.max_frame_bytes.max(1),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn renderer(&self) -> &Renderer<S> {
        &self.renderer
    }

    /// Accept connections until the process is stopped.
    pub async fn serve(mut self) {
        loop {
            self.accept_once().await;
        }
    }

    /// Accept one connection and read it until the peer goes away.
    pub async fn accept_once(&mut self) {
        match self.listener.accept().await {
            Ok((stream, peer)) => {
                info!(target: "dashboard", peer = %peer, "Publisher connected");
                self.serve_connection(stream, peer).await;
                info!(target: "dashboard", peer = %peer, "Publisher disconnected");
            }
            Err(e) => {
                warn!(target: "dashboard", error = %e, "Accept failed");
            }
        }
    }

    async fn serve_connection(&mut self, stream: TcpStream, peer: SocketAddr) {
        let mut reader = BufReader::new(stream);
        let mut frame = Vec::new();
        loop {
            let decoded = match read_frame(&mut reader, &mut frame, self.max_frame_bytes).await {
                Ok(Frame::Line) => decode_frame(&frame),
                Ok(Frame::Oversized(len)) => Err(DecodeError::Oversized {
                    len,
                    limit: self.max_frame_bytes,
                }),
                Ok(Frame::Eof) => break,
                Err(e) => {
                    warn!(target: "dashboard", peer = %peer, error = %e, "Connection read failed");
                    break;
                }
            };

            let message = match decoded {
                Ok(message) => message,
                Err(DecodeError::Empty) => continue,
                Err(e) => {
                    warn!(target: "dashboard", peer = %peer, error = %e, "Dropping undecodable message");
                    continue;
                }
            };
            debug!(
                target: "dashboard",
                leader = %message.leader,
                participants = message.commit.len(),
                "Snapshot received"
            );

            if let Err(e) = self.renderer.render(&message.leader, &message.commit).await {
                warn!(target: "dashboard", error = %e, "Render failed");
            }
        }
    }
}

/// Outcome of reading one newline-terminated frame
#[derive(Debug, PartialEq, Eq)]
enum Frame {
    /// `buf` holds the frame
    Line,
    /// Frame exceeded the limit; its bytes were skipped
    Oversized(usize),
    Eof,
}

/// Read up to and including the next `\n` into `buf`. Once the frame grows
/// past `limit`, the rest of it is consumed without buffering. A trailing
/// frame without a newline still counts at end of stream.
async fn read_frame<R>(reader: &mut R, buf: &mut Vec<u8>, limit: usize) -> io::Result<Frame>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let mut skipped = 0usize;
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(if skipped > 0 {
                Frame::Oversized(skipped)
            } else if buf.is_empty() {
                Frame::Eof
            } else {
                Frame::Line
            });
        }

        let (used, complete) = match available.iter().position(|&b| b == b'\n') {
            Some(i) => (i + 1, true),
            None => (available.len(), false),
        };
        if skipped > 0 || buf.len() + used > limit {
            skipped += buf.len() + used;
            buf.clear();
        } else {
            buf.extend_from_slice(&available[..used]);
        }
        reader.consume(used);

        if complete {
            return Ok(if skipped > 0 {
                Frame::Oversized(skipped)
            } else {
                Frame::Line
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn frames_split_on_newline() {
        let mut reader: &[u8] = b"one\ntwo\nthree";
        let mut buf = Vec::new();

        assert_eq!(read_frame(&mut reader, &mut buf, 16).await.unwrap(), Frame::Line);
        assert_eq!(buf, b"one\n");
        assert_eq!(read_frame(&mut reader, &mut buf, 16).await.unwrap(), Frame::Line);
        assert_eq!(buf, b"two\n");
        assert_eq!(read_frame(&mut reader, &mut buf, 16).await.unwrap(), Frame::Line);
        assert_eq!(buf, b"three");
        assert_eq!(read_frame(&mut reader, &mut buf, 16).await.unwrap(), Frame::Eof);
    }

    #[tokio::test]
    async fn oversized_frame_is_skipped_to_next_newline() {
        // Small buffer capacity forces the frame across several fills
        let data: &[u8] = b"0123456789abcdef0123\nok\n";
        let mut reader = BufReader::with_capacity(4, data);
        let mut buf = Vec::new();

        assert_eq!(
            read_frame(&mut reader, &mut buf, 8).await.unwrap(),
            Frame::Oversized(21)
        );
        assert!(buf.is_empty());
        assert_eq!(read_frame(&mut reader, &mut buf, 8).await.unwrap(), Frame::Line);
        assert_eq!(buf, b"ok\n");
    }

    #[tokio::test]
    async fn unterminated_oversized_frame_ends_at_eof() {
        let data = vec![b'x'; 100];
        let mut reader = BufReader::with_capacity(16, data.as_slice());
        let mut buf = Vec::new();

        assert_eq!(
            read_frame(&mut reader, &mut buf, 10).await.unwrap(),
            Frame::Oversized(100)
        );
        assert_eq!(read_frame(&mut reader, &mut buf, 10).await.unwrap(), Frame::Eof);
    }
}
