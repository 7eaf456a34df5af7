//! Binary codec for bridge protocol messages.
//!
//! Wire format:
//! ```text
//! [version:1][msg_type:1][payload_len:2][seq:4][payload:N]
//! ```
//! Total header size: 8 bytes. All multi-byte integers are big-endian.
//!
//! Payload layouts:
//! - `Hello`:      `[appliance_id:16][protocol_version:1][name_len:2][name:N]`
//! - `HelloAck`:   `[accepted:1]`
//! - `Ping`/`Pong`: `[token:4]`
//! - `Disconnect`: empty
//! - `Report`:     the 8-byte boot-protocol report

use thiserror::Error;
use uuid::Uuid;

use crate::protocol::messages::{
    BridgeMessage, HelloMessage, KeyReport, MessageType, HEADER_SIZE, PROTOCOL_VERSION,
    REPORT_SIZE,
};

/// Errors that can occur during message encoding or decoding.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The byte slice is shorter than the header plus declared payload.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The message type byte in the header is not a recognized value.
    #[error("unknown message type: 0x{0:02X}")]
    UnknownMessageType(u8),

    /// The protocol version in the header is not supported.
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u8),

    /// The payload bytes do not match the layout the type requires.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

/// Encodes a [`BridgeMessage`] into a byte vector including the header.
///
/// The sequence number is supplied by the caller — take it from a
/// [`crate::protocol::SequenceCounter`].
pub fn encode_message(msg: &BridgeMessage, sequence: u32) -> Vec<u8> {
    let payload = encode_payload(msg);

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.push(PROTOCOL_VERSION);
    buf.push(msg.message_type() as u8);
    buf.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    buf.extend_from_slice(&sequence.to_be_bytes());
    buf.extend_from_slice(&payload);
    buf
}

/// Decodes one [`BridgeMessage`] from the beginning of `bytes`.
///
/// Returns the message and the total number of bytes consumed (header plus
/// payload) so the caller can advance its read cursor.
///
/// # Errors
///
/// Returns [`ProtocolError`] if the bytes are truncated or malformed.
pub fn decode_message(bytes: &[u8]) -> Result<(BridgeMessage, usize), ProtocolError> {
    if bytes.len() < HEADER_SIZE {
        return Err(ProtocolError::InsufficientData {
            needed: HEADER_SIZE,
            available: bytes.len(),
        });
    }

    let version = bytes[0];
    if version != PROTOCOL_VERSION {
        return Err(ProtocolError::UnsupportedVersion(version));
    }

    let type_byte = bytes[1];
    let msg_type = MessageType::try_from(type_byte)
        .map_err(|_| ProtocolError::UnknownMessageType(type_byte))?;

    let payload_len = u16::from_be_bytes([bytes[2], bytes[3]]) as usize;
    let total = HEADER_SIZE + payload_len;
    if bytes.len() < total {
        return Err(ProtocolError::InsufficientData {
            needed: total,
            available: bytes.len(),
        });
    }

    let payload = &bytes[HEADER_SIZE..total];
    let msg = decode_payload(msg_type, payload)?;
    Ok((msg, total))
}

/// Reads the declared payload length out of a raw header.
///
/// Used by stream readers that must know how many more bytes to await after
/// receiving the fixed-size header.
pub fn payload_length(header: &[u8; HEADER_SIZE]) -> usize {
    u16::from_be_bytes([header[2], header[3]]) as usize
}

// ── Payload encoding ──────────────────────────────────────────────────────────

fn encode_payload(msg: &BridgeMessage) -> Vec<u8> {
    match msg {
        BridgeMessage::Hello(hello) => {
            let name = hello.appliance_name.as_bytes();
            let mut buf = Vec::with_capacity(16 + 1 + 2 + name.len());
            buf.extend_from_slice(hello.appliance_id.as_bytes());
            buf.push(hello.protocol_version);
            buf.extend_from_slice(&(name.len() as u16).to_be_bytes());
            buf.extend_from_slice(name);
            buf
        }
        BridgeMessage::HelloAck { accepted } => vec![u8::from(*accepted)],
        BridgeMessage::Ping(token) | BridgeMessage::Pong(token) => token.to_be_bytes().to_vec(),
        BridgeMessage::Disconnect => Vec::new(),
        BridgeMessage::Report(report) => report.to_bytes().to_vec(),
    }
}

// ── Payload decoding ──────────────────────────────────────────────────────────

fn decode_payload(msg_type: MessageType, payload: &[u8]) -> Result<BridgeMessage, ProtocolError> {
    match msg_type {
        MessageType::Hello => {
            if payload.len() < 19 {
                return Err(ProtocolError::MalformedPayload(
                    "hello payload too short".to_string(),
                ));
            }
            let appliance_id = Uuid::from_slice(&payload[..16])
                .map_err(|e| ProtocolError::MalformedPayload(format!("bad uuid: {e}")))?;
            let protocol_version = payload[16];
            let name_len = u16::from_be_bytes([payload[17], payload[18]]) as usize;
            let name_bytes = payload
                .get(19..19 + name_len)
                .ok_or_else(|| ProtocolError::MalformedPayload("name truncated".to_string()))?;
            let appliance_name = String::from_utf8(name_bytes.to_vec())
                .map_err(|e| ProtocolError::MalformedPayload(format!("name not utf-8: {e}")))?;
            Ok(BridgeMessage::Hello(HelloMessage {
                appliance_id,
                appliance_name,
                protocol_version,
            }))
        }
        MessageType::HelloAck => {
            let byte = payload.first().ok_or_else(|| {
                ProtocolError::MalformedPayload("hello-ack payload empty".to_string())
            })?;
            Ok(BridgeMessage::HelloAck {
                accepted: *byte != 0,
            })
        }
        MessageType::Ping | MessageType::Pong => {
            let bytes: [u8; 4] = payload.try_into().map_err(|_| {
                ProtocolError::MalformedPayload("ping/pong token must be 4 bytes".to_string())
            })?;
            let token = u32::from_be_bytes(bytes);
            Ok(match msg_type {
                MessageType::Ping => BridgeMessage::Ping(token),
                _ => BridgeMessage::Pong(token),
            })
        }
        MessageType::Disconnect => Ok(BridgeMessage::Disconnect),
        MessageType::Report => {
            if payload.len() != REPORT_SIZE {
                return Err(ProtocolError::MalformedPayload(format!(
                    "report must be {REPORT_SIZE} bytes, got {}",
                    payload.len()
                )));
            }
            let report = KeyReport::from_bytes(payload)
                .ok_or_else(|| ProtocolError::MalformedPayload("report truncated".to_string()))?;
            Ok(BridgeMessage::Report(report))
        }
    }
}
