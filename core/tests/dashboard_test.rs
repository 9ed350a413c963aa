//! Dashboard Tests
//!
//! - Wire protocol encode/decode
//! - Renderer reset policy (key-set identity)
//! - Server: message framing, decode/render errors, reconnects

use logwatch_core::dashboard::{
    decode_frame, decode_line, encode_line, Bar, ChartSurface, DashboardConfig, DashboardServer, Renderer,
};
use logwatch_core::status::interpret;
use logwatch_core::{DecodeError, RenderError};
use serde_json::json;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// Surface that records every call instead of drawing
#[derive(Default)]
struct RecordingSurface {
    clears: usize,
    staged: Option<Vec<Bar>>,
    frames: Vec<Vec<Bar>>,
    /// Fail drawing any frame containing this value
    fail_on: Option<u64>,
}

impl ChartSurface for RecordingSurface {
    fn clear(&mut self) -> Result<(), RenderError> {
        self.clears += 1;
        Ok(())
    }

    fn draw_bars(&mut self, _title: &str, bars: &[Bar]) -> Result<(), RenderError> {
        if let Some(bad) = self.fail_on {
            if bars.iter().any(|b| b.value == bad) {
                return Err(RenderError::Surface("refusing to draw".to_string()));
            }
        }
        self.staged = Some(bars.to_vec());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), RenderError> {
        if let Some(bars) = self.staged.take() {
            self.frames.push(bars);
        }
        Ok(())
    }
}

fn pairs(items: &[(&str, u64)]) -> Vec<(String, u64)> {
    items.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn values(frame: &[Bar]) -> Vec<u64> {
    frame.iter().map(|b| b.value).collect()
}

// =============================================================================
// Protocol
// =============================================================================

#[test]
fn encode_line_matches_wire_shape() {
    let status = serde_json::from_value(json!({
        "leaderId": "P1",
        "participants": {
            "P1": {"response": {"local": {"commitIndex": 5}}},
            "P2": {"response": {"local": {"commitIndex": 4}}}
        }
    }))
    .unwrap();
    let snapshot = interpret(&status, None).unwrap();

    let line = encode_line(&snapshot).unwrap();
    assert!(line.ends_with('\n'));
    assert_eq!(line.matches('\n').count(), 1);
    assert_eq!(line.trim_end(), r#"{"leader":"P1","commit":{"P1":5,"P2":4}}"#);
}

#[test]
fn encode_line_without_leader_uses_empty_string() {
    let status = serde_json::from_value(json!({"participants": {}})).unwrap();
    let snapshot = interpret(&status, None).unwrap();
    assert_eq!(
        encode_line(&snapshot).unwrap(),
        "{\"leader\":\"\",\"commit\":{}}\n"
    );
}

#[test]
fn decode_line_keeps_commit_order() {
    let message = decode_line("{\"leader\":\"x\",\"commit\":{\"zz\":1,\"aa\":2}}\r\n").unwrap();
    assert_eq!(message.leader, "x");
    assert_eq!(message.commit, pairs(&[("zz", 1), ("aa", 2)]));
}

#[test]
fn decode_line_rejects_garbage() {
    assert!(matches!(decode_line("   "), Err(DecodeError::Empty)));
    assert!(matches!(decode_line("{not json"), Err(DecodeError::Json(_))));
    assert!(decode_line(r#"{"leader":"x","commit":{"a":-1}}"#).is_err());
    assert!(decode_line(r#"{"leader":"x"}"#).is_err());
}

#[test]
fn decode_frame_rejects_invalid_utf8() {
    assert!(matches!(
        decode_frame(b"\xff\xfe garbage\n"),
        Err(DecodeError::Utf8(_))
    ));
    let message = decode_frame(b"{\"leader\":\"P1\",\"commit\":{\"a\":1}}\n").unwrap();
    assert_eq!(message.commit, pairs(&[("a", 1)]));
}

// =============================================================================
// Renderer
// =============================================================================

#[tokio::test]
async fn same_keys_do_not_clear() {
    let mut renderer = Renderer::new(RecordingSurface::default(), Duration::ZERO);

    renderer.render("P1", &pairs(&[("serverkey001", 5), ("serverkey002", 7)])).await.unwrap();
    renderer.render("P1", &pairs(&[("serverkey001", 9), ("serverkey002", 7)])).await.unwrap();

    let surface = renderer.surface();
    assert_eq!(surface.clears, 1, "only the first frame resets the chart");
    assert_eq!(surface.frames.len(), 2);
    assert_eq!(values(&surface.frames[0]), vec![5, 7]);
    assert_eq!(values(&surface.frames[1]), vec![9, 7]);
    assert_eq!(renderer.state().current_values, pairs(&[("serverkey001", 9), ("serverkey002", 7)]));
}

#[tokio::test]
async fn changed_keys_clear() {
    let mut renderer = Renderer::new(RecordingSurface::default(), Duration::ZERO);

    renderer.render("P1", &pairs(&[("PRMR-aaaaaa", 1), ("PRMR-bbbbbb", 1)])).await.unwrap();
    renderer.render("P1", &pairs(&[("PRMR-aaaaaa", 2), ("PRMR-cccccc", 2)])).await.unwrap();
    renderer.render("P1", &pairs(&[("PRMR-aaaaaa", 3)])).await.unwrap();

    assert_eq!(renderer.surface().clears, 3);
    let keys: Vec<&str> = renderer.state().current_keys.iter().map(String::as_str).collect();
    assert_eq!(keys, vec!["PRMR-aaaaaa"]);
}

#[tokio::test]
async fn bars_follow_commit_order_with_short_labels() {
    let mut renderer = Renderer::new(RecordingSurface::default(), Duration::ZERO);
    renderer
        .render("", &pairs(&[("PRMR-zz0001-x", 4), ("PRMR-aa0002-y", 6)]))
        .await
        .unwrap();

    let labels: Vec<&str> = renderer.surface().frames[0]
        .iter()
        .map(|b| b.label.as_str())
        .collect();
    assert_eq!(labels, vec!["zz0001", "aa0002"]);
}

// =============================================================================
// Server
// =============================================================================

async fn bind(surface: RecordingSurface) -> (DashboardServer<RecordingSurface>, SocketAddr) {
    bind_with_limit(surface, DashboardConfig::default().max_frame_bytes).await
}

async fn bind_with_limit(
    surface: RecordingSurface,
    max_frame_bytes: usize,
) -> (DashboardServer<RecordingSurface>, SocketAddr) {
    let config = DashboardConfig {
        port: 0,
        frame_delay_ms: 0,
        headless: true,
        max_frame_bytes,
        ..Default::default()
    };
    let server = DashboardServer::bind(&config, Renderer::new(surface, Duration::ZERO))
        .await
        .expect("bind");
    let addr = server.local_addr().unwrap();
    (server, addr)
}

fn send(addr: SocketAddr, payload: &'static [u8]) -> tokio::task::JoinHandle<()> {
    send_owned(addr, payload.to_vec())
}

fn send_owned(addr: SocketAddr, payload: Vec<u8>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(&payload).await.unwrap();
        stream.shutdown().await.unwrap();
    })
}

#[tokio::test]
async fn value_update_redraws_without_reset() {
    let (mut server, addr) = bind(RecordingSurface::default()).await;

    let client = send(
        addr,
        b"{\"leader\":\"P1\",\"commit\":{\"serverkey001\":5,\"serverkey002\":7}}\n\
          {\"leader\":\"P1\",\"commit\":{\"serverkey001\":9,\"serverkey002\":7}}\n",
    );
    server.accept_once().await;
    client.await.unwrap();

    let surface = server.renderer().surface();
    assert_eq!(surface.clears, 1);
    assert_eq!(surface.frames.len(), 2);
    assert_eq!(values(&surface.frames[0]), vec![5, 7]);
    assert_eq!(values(&surface.frames[1]), vec![9, 7]);
}

#[tokio::test]
async fn bad_message_keeps_connection_open() {
    let (mut server, addr) = bind(RecordingSurface::default()).await;

    let client = send(
        addr,
        b"{\"leader\":\"P1\",\"commit\":{\"a\":1}}\n\
          this is not json\n\
          \n\
          {\"leader\":\"P1\",\"commit\":{\"a\":2}}\n",
    );
    server.accept_once().await;
    client.await.unwrap();

    let frames = &server.renderer().surface().frames;
    assert_eq!(frames.len(), 2);
    assert_eq!(values(&frames[1]), vec![2]);
}

#[tokio::test]
async fn non_utf8_message_keeps_connection_open() {
    let (mut server, addr) = bind(RecordingSurface::default()).await;

    let client = send(
        addr,
        b"{\"leader\":\"P1\",\"commit\":{\"a\":1}}\n\
          \xff\xfe garbage\n\
          {\"leader\":\"P1\",\"commit\":{\"a\":2}}\n",
    );
    server.accept_once().await;
    client.await.unwrap();

    let frames = &server.renderer().surface().frames;
    assert_eq!(frames.len(), 2);
    assert_eq!(values(&frames[0]), vec![1]);
    assert_eq!(values(&frames[1]), vec![2]);
}

#[tokio::test]
async fn oversized_message_is_skipped() {
    let (mut server, addr) = bind_with_limit(RecordingSurface::default(), 128).await;

    let mut payload = b"{\"leader\":\"P1\",\"commit\":{\"a\":1}}\n".to_vec();
    payload.extend(std::iter::repeat(b'x').take(64 * 1024));
    payload.extend_from_slice(b"\n{\"leader\":\"P1\",\"commit\":{\"a\":2}}\n");
    // Never terminated: dropped at end of stream
    payload.extend(std::iter::repeat(b'y').take(4 * 1024));

    let client = send_owned(addr, payload);
    server.accept_once().await;
    client.await.unwrap();

    let frames = &server.renderer().surface().frames;
    assert_eq!(frames.len(), 2);
    assert_eq!(values(&frames[0]), vec![1]);
    assert_eq!(values(&frames[1]), vec![2]);
}

#[tokio::test]
async fn render_error_does_not_stop_server() {
    let surface = RecordingSurface {
        fail_on: Some(13),
        ..Default::default()
    };
    let (mut server, addr) = bind(surface).await;

    let client = send(
        addr,
        b"{\"leader\":\"P1\",\"commit\":{\"a\":13}}\n{\"leader\":\"P1\",\"commit\":{\"a\":14}}\n",
    );
    server.accept_once().await;
    client.await.unwrap();

    let frames = &server.renderer().surface().frames;
    assert_eq!(frames.len(), 1);
    assert_eq!(values(&frames[0]), vec![14]);
}

#[tokio::test]
async fn chart_state_survives_reconnect() {
    let (mut server, addr) = bind(RecordingSurface::default()).await;

    let first = send(addr, b"{\"leader\":\"P1\",\"commit\":{\"a\":1,\"b\":1}}\n");
    server.accept_once().await;
    first.await.unwrap();

    let second = send(addr, b"{\"leader\":\"P2\",\"commit\":{\"a\":2,\"b\":3}}\n");
    server.accept_once().await;
    second.await.unwrap();

    let surface = server.renderer().surface();
    assert_eq!(surface.clears, 1, "same participants across connections");
    assert_eq!(surface.frames.len(), 2);
}
