//! HID bridge transport: the production [`HidEmitter`].
//!
//! The appliance reaches its target computer through a small bridge agent
//! that replays boot-protocol keyboard reports as local input. This module
//! owns the TCP connection to that agent:
//!
//! - A background task runs a continuous reconnect loop: connect, announce
//!   with `Hello`, pump the read loop, and retry after an interval when the
//!   connection drops.
//! - The connection flag is the emitter's `is_connected` answer; it is the
//!   only state other components ever read from here.
//! - Inbound traffic is minimal: `HelloAck`, keepalive `Ping` (answered with
//!   `Pong` carrying the same token), and `Disconnect`.
//!
//! Writes on a dead connection fail with a transport error per operation;
//! the macro sequencer logs those and keeps going, by design.

pub mod mock;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{tcp::OwnedWriteHalf, TcpStream};
use tokio::sync::Mutex;
use tokio::time;
use tracing::{debug, info, warn};
use uuid::Uuid;

use keyfob_core::keymap::ascii::char_to_usage;
use keyfob_core::protocol::{
    codec,
    messages::{BridgeMessage, HelloMessage, KeyReport, HEADER_SIZE, PROTOCOL_VERSION},
    SequenceCounter,
};
use keyfob_core::HidKey;

use crate::application::run_macro::{EmitterError, HidEmitter};

/// Configuration for the bridge connection.
#[derive(Debug, Clone)]
pub struct BridgeEmitterConfig {
    /// Address of the bridge agent on the target computer.
    pub target_addr: SocketAddr,
    /// Reconnect interval after a drop or failed attempt.
    pub reconnect_interval: Duration,
    /// Identity announced in the `Hello` handshake.
    pub appliance_id: Uuid,
    /// Human-readable name shown by the bridge agent.
    pub appliance_name: String,
    /// Pause between per-character reports while typing text.
    pub inter_key_delay: Duration,
}

impl Default for BridgeEmitterConfig {
    fn default() -> Self {
        Self {
            target_addr: "127.0.0.1:24900".parse().expect("static addr"),
            reconnect_interval: Duration::from_secs(5),
            appliance_id: Uuid::nil(),
            appliance_name: "keyfob".to_string(),
            inter_key_delay: Duration::from_millis(8),
        }
    }
}

/// TCP-backed [`HidEmitter`] with automatic reconnection.
pub struct BridgeEmitter {
    config: BridgeEmitterConfig,
    write_half: Mutex<Option<OwnedWriteHalf>>,
    connected: AtomicBool,
    seq: SequenceCounter,
}

impl BridgeEmitter {
    /// Creates a new (not yet connected) emitter.
    pub fn new(config: BridgeEmitterConfig) -> Self {
        Self {
            config,
            write_half: Mutex::new(None),
            connected: AtomicBool::new(false),
            seq: SequenceCounter::new(),
        }
    }

    /// Spawns the background reconnect loop. Runs until `running` clears.
    pub fn start(self: Arc<Self>, running: Arc<AtomicBool>) {
        let this = self;
        tokio::spawn(async move {
            while running.load(Ordering::Relaxed) {
                match TcpStream::connect(this.config.target_addr).await {
                    Ok(stream) => {
                        info!("bridge connected to {}", this.config.target_addr);
                        this.session(stream).await;
                        warn!(
                            "bridge disconnected; retrying in {:?}",
                            this.config.reconnect_interval
                        );
                    }
                    Err(e) => {
                        debug!(
                            "bridge unreachable at {}: {e}",
                            this.config.target_addr
                        );
                    }
                }
                if running.load(Ordering::Relaxed) {
                    time::sleep(this.config.reconnect_interval).await;
                }
            }
        });
    }

    /// Drives one established connection to completion.
    async fn session(&self, stream: TcpStream) {
        let (read_half, write_half) = stream.into_split();
        {
            let mut guard = self.write_half.lock().await;
            *guard = Some(write_half);
        }
        self.connected.store(true, Ordering::Relaxed);

        let hello = BridgeMessage::Hello(HelloMessage {
            appliance_id: self.config.appliance_id,
            appliance_name: self.config.appliance_name.clone(),
            protocol_version: PROTOCOL_VERSION,
        });
        if let Err(e) = self.send(&hello).await {
            warn!("hello failed: {e}");
        }

        self.read_loop(read_half).await;

        self.connected.store(false, Ordering::Relaxed);
        let mut guard = self.write_half.lock().await;
        *guard = None;
    }

    /// Reads framed messages until the peer goes away.
    async fn read_loop(&self, mut reader: tokio::net::tcp::OwnedReadHalf) {
        let mut header = [0u8; HEADER_SIZE];
        loop {
            if let Err(e) = reader.read_exact(&mut header).await {
                if e.kind() != std::io::ErrorKind::UnexpectedEof {
                    warn!("bridge read error: {e}");
                }
                break;
            }

            let payload_len = codec::payload_length(&header);
            let mut frame = header.to_vec();
            frame.resize(HEADER_SIZE + payload_len, 0);
            if payload_len > 0 {
                if let Err(e) = reader.read_exact(&mut frame[HEADER_SIZE..]).await {
                    warn!("bridge payload read error: {e}");
                    break;
                }
            }

            match codec::decode_message(&frame) {
                Ok((BridgeMessage::Ping(token), _)) => {
                    if let Err(e) = self.send(&BridgeMessage::Pong(token)).await {
                        warn!("pong failed: {e}");
                    }
                }
                Ok((BridgeMessage::HelloAck { accepted }, _)) => {
                    if accepted {
                        debug!("bridge accepted handshake");
                    } else {
                        warn!("bridge rejected handshake");
                        break;
                    }
                }
                Ok((BridgeMessage::Disconnect, _)) => {
                    info!("bridge sent disconnect");
                    break;
                }
                Ok((other, _)) => {
                    debug!("ignoring unexpected bridge message: {other:?}");
                }
                Err(e) => {
                    warn!("undecodable bridge frame: {e}");
                }
            }
        }
    }

    /// Encodes and writes one message on the current connection.
    async fn send(&self, msg: &BridgeMessage) -> Result<(), EmitterError> {
        let bytes = codec::encode_message(msg, self.seq.next());
        let mut guard = self.write_half.lock().await;
        match guard.as_mut() {
            Some(writer) => writer
                .write_all(&bytes)
                .await
                .map_err(|e| EmitterError::Transport(e.to_string())),
            None => Err(EmitterError::Transport(
                "no active bridge connection".to_string(),
            )),
        }
    }
}

#[async_trait]
impl HidEmitter for BridgeEmitter {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    async fn press(&self, keys: &[HidKey]) -> Result<(), EmitterError> {
        self.send(&BridgeMessage::Report(KeyReport::from_keys(keys)))
            .await
    }

    async fn release_all(&self) -> Result<(), EmitterError> {
        self.send(&BridgeMessage::Report(KeyReport::released()))
            .await
    }

    async fn send_text(&self, chunk: &str) -> Result<(), EmitterError> {
        for ch in chunk.chars() {
            let Some((usage, shift)) = char_to_usage(ch) else {
                warn!("no HID mapping for {ch:?}, skipping");
                continue;
            };
            self.send(&BridgeMessage::Report(KeyReport::from_usage(usage, shift)))
                .await?;
            time::sleep(self.config.inter_key_delay).await;
            self.send(&BridgeMessage::Report(KeyReport::released()))
                .await?;
            time::sleep(self.config.inter_key_delay).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    /// Accepts one connection and returns every decoded message until EOF.
    async fn run_fake_peer(listener: TcpListener) -> Vec<BridgeMessage> {
        let (mut stream, _) = listener.accept().await.expect("accept");
        let mut buf = Vec::new();
        let mut chunk = [0u8; 256];
        loop {
            match stream.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        }
        let mut messages = Vec::new();
        let mut cursor = 0;
        while cursor < buf.len() {
            let (msg, consumed) = codec::decode_message(&buf[cursor..]).expect("frame");
            messages.push(msg);
            cursor += consumed;
        }
        messages
    }

    async fn connected_emitter(addr: SocketAddr) -> Arc<BridgeEmitter> {
        let emitter = Arc::new(BridgeEmitter::new(BridgeEmitterConfig {
            target_addr: addr,
            reconnect_interval: Duration::from_secs(60),
            inter_key_delay: Duration::from_millis(1),
            ..Default::default()
        }));
        let running = Arc::new(AtomicBool::new(true));
        Arc::clone(&emitter).start(Arc::clone(&running));
        // Wait for the background task to establish the session.
        for _ in 0..100 {
            if emitter.is_connected() {
                break;
            }
            time::sleep(Duration::from_millis(10)).await;
        }
        assert!(emitter.is_connected(), "emitter must connect to fake peer");
        emitter
    }

    #[tokio::test]
    async fn test_emitter_announces_itself_and_transmits_reports() {
        // Arrange: a fake bridge peer on an ephemeral port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let peer = tokio::spawn(run_fake_peer(listener));

        // Act
        let emitter = connected_emitter(addr).await;
        emitter
            .press(&[HidKey::ControlLeft, HidKey::AltLeft, HidKey::Delete])
            .await
            .unwrap();
        emitter.release_all().await.unwrap();
        // Closing the write half ends the peer's read loop.
        {
            let mut guard = emitter.write_half.lock().await;
            *guard = None;
        }

        // Assert
        let messages = peer.await.unwrap();
        assert!(
            matches!(&messages[0], BridgeMessage::Hello(h) if h.appliance_name == "keyfob"),
            "first message must be the Hello handshake"
        );
        let expected = KeyReport::from_keys(&[
            HidKey::ControlLeft,
            HidKey::AltLeft,
            HidKey::Delete,
        ]);
        assert_eq!(messages[1], BridgeMessage::Report(expected));
        assert!(matches!(&messages[2], BridgeMessage::Report(r) if r.is_release()));
    }

    #[tokio::test]
    async fn test_send_text_produces_press_release_pairs() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let peer = tokio::spawn(run_fake_peer(listener));

        let emitter = connected_emitter(addr).await;
        emitter.send_text("Hi").await.unwrap();
        {
            let mut guard = emitter.write_half.lock().await;
            *guard = None;
        }

        let messages = peer.await.unwrap();
        // Hello + 2 chars × (press + release)
        assert_eq!(messages.len(), 5);
        assert!(matches!(
            &messages[1],
            BridgeMessage::Report(r) if r.keys[0] == 0x0B && r.modifiers == 0x02
        ));
        assert!(matches!(&messages[2], BridgeMessage::Report(r) if r.is_release()));
        assert!(matches!(
            &messages[3],
            BridgeMessage::Report(r) if r.keys[0] == 0x0C && r.modifiers == 0x00
        ));
    }

    #[tokio::test]
    async fn test_writes_without_a_connection_fail_with_transport_error() {
        let emitter = BridgeEmitter::new(BridgeEmitterConfig::default());
        assert!(!emitter.is_connected());
        let result = emitter.press(&[HidKey::A]).await;
        assert!(matches!(result, Err(EmitterError::Transport(_))));
    }
}
