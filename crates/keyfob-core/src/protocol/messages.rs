//! Bridge protocol message types.
//!
//! The input-bearing message is [`KeyReport`]: a standard 8-byte
//! boot-protocol keyboard report, identical in layout to what a USB or BLE
//! keyboard transmits —
//!
//! ```text
//! Byte 0:   modifier bitfield (bit 0 = Left Ctrl … bit 7 = Right GUI)
//! Byte 1:   reserved (0x00)
//! Byte 2-7: up to six simultaneous key usage IDs
//! ```
//!
//! An all-zero report releases every key. Control messages handle the
//! session: `Hello`/`HelloAck` handshake on connect, `Ping`/`Pong` keepalive,
//! `Disconnect` for a deliberate close.

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::keymap::hid::HidKey;

/// Current protocol version byte.
pub const PROTOCOL_VERSION: u8 = 0x01;

/// Size of the fixed message header in bytes.
pub const HEADER_SIZE: usize = 8;

/// Size of a boot-protocol keyboard report in bytes.
pub const REPORT_SIZE: usize = 8;

/// Message type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageType {
    Hello = 0x01,
    HelloAck = 0x02,
    Ping = 0x03,
    Pong = 0x04,
    Disconnect = 0x05,
    Report = 0x10,
}

impl TryFrom<u8> for MessageType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0x01 => Ok(MessageType::Hello),
            0x02 => Ok(MessageType::HelloAck),
            0x03 => Ok(MessageType::Ping),
            0x04 => Ok(MessageType::Pong),
            0x05 => Ok(MessageType::Disconnect),
            0x10 => Ok(MessageType::Report),
            _ => Err(()),
        }
    }
}

/// Boot-protocol keyboard report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyReport {
    /// Modifier bitfield (byte 0 of the report).
    pub modifiers: u8,
    /// Up to six simultaneously held key usage IDs; unused slots are zero.
    pub keys: [u8; 6],
}

impl KeyReport {
    /// The all-keys-released report.
    pub fn released() -> Self {
        Self::default()
    }

    /// Packs a chord of named keys into one report. Modifiers go into the
    /// bitfield; ordinary keys fill the six usage slots. A chord naming more
    /// than six ordinary keys exceeds boot-protocol rollover — the excess is
    /// dropped with a warning.
    pub fn from_keys(keys: &[HidKey]) -> Self {
        let mut report = Self::default();
        let mut slot = 0;
        for key in keys {
            match key.modifier_bit() {
                Some(bit) => report.modifiers |= bit,
                None => {
                    if slot < report.keys.len() {
                        report.keys[slot] = key.usage();
                        slot += 1;
                    } else {
                        warn!("chord exceeds 6-key rollover, dropping {key:?}");
                    }
                }
            }
        }
        report
    }

    /// A report holding one raw usage ID, optionally with Shift.
    pub fn from_usage(usage: u8, shift: bool) -> Self {
        let mut report = Self::default();
        report.keys[0] = usage;
        if shift {
            report.modifiers |= 0x02; // Left Shift
        }
        report
    }

    /// True if no key and no modifier is held.
    pub fn is_release(&self) -> bool {
        self.modifiers == 0 && self.keys.iter().all(|&k| k == 0)
    }

    /// Serializes into the 8-byte wire layout.
    pub fn to_bytes(&self) -> [u8; REPORT_SIZE] {
        let mut buf = [0u8; REPORT_SIZE];
        buf[0] = self.modifiers;
        // buf[1] is the reserved byte, always zero.
        buf[2..].copy_from_slice(&self.keys);
        buf
    }

    /// Parses the 8-byte wire layout; `None` if the slice is too short.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < REPORT_SIZE {
            return None;
        }
        let mut keys = [0u8; 6];
        keys.copy_from_slice(&data[2..REPORT_SIZE]);
        Some(Self {
            modifiers: data[0],
            keys,
        })
    }
}

/// Handshake announcement sent by the appliance after connecting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloMessage {
    /// Stable identity of this appliance instance.
    pub appliance_id: Uuid,
    /// Human-readable name shown by the bridge peer.
    pub appliance_name: String,
    /// Must equal [`PROTOCOL_VERSION`].
    pub protocol_version: u8,
}

/// All bridge protocol messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BridgeMessage {
    Hello(HelloMessage),
    HelloAck { accepted: bool },
    Ping(u32),
    Pong(u32),
    Disconnect,
    Report(KeyReport),
}

impl BridgeMessage {
    /// The wire type code for this message.
    pub fn message_type(&self) -> MessageType {
        match self {
            BridgeMessage::Hello(_) => MessageType::Hello,
            BridgeMessage::HelloAck { .. } => MessageType::HelloAck,
            BridgeMessage::Ping(_) => MessageType::Ping,
            BridgeMessage::Pong(_) => MessageType::Pong,
            BridgeMessage::Disconnect => MessageType::Disconnect,
            BridgeMessage::Report(_) => MessageType::Report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_keys_splits_modifiers_from_ordinary_keys() {
        // Arrange / Act: the Ctrl+Alt+Del chord
        let report =
            KeyReport::from_keys(&[HidKey::ControlLeft, HidKey::AltLeft, HidKey::Delete]);

        // Assert: Ctrl (bit 0) and Alt (bit 2) in the bitfield, Delete in slot 0
        assert_eq!(report.modifiers, 0x01 | 0x04);
        assert_eq!(report.keys[0], 0x4C);
        assert!(report.keys[1..].iter().all(|&k| k == 0));
    }

    #[test]
    fn test_from_keys_truncates_beyond_six_ordinary_keys() {
        let seven = [
            HidKey::A,
            HidKey::B,
            HidKey::C,
            HidKey::D,
            HidKey::E,
            HidKey::F,
            HidKey::G,
        ];
        let report = KeyReport::from_keys(&seven);
        assert_eq!(report.keys, [0x04, 0x05, 0x06, 0x07, 0x08, 0x09]);
    }

    #[test]
    fn test_from_usage_with_shift_sets_left_shift_bit() {
        let report = KeyReport::from_usage(0x04, true);
        assert_eq!(report.modifiers, 0x02);
        assert_eq!(report.keys[0], 0x04);
    }

    #[test]
    fn test_released_report_is_release() {
        assert!(KeyReport::released().is_release());
        assert!(!KeyReport::from_usage(0x04, false).is_release());
        // A bare modifier still counts as held.
        assert!(!KeyReport::from_keys(&[HidKey::ShiftLeft]).is_release());
    }

    #[test]
    fn test_report_byte_layout_round_trips() {
        // Arrange
        let original = KeyReport::from_keys(&[HidKey::MetaLeft, HidKey::X]);

        // Act
        let bytes = original.to_bytes();
        let parsed = KeyReport::from_bytes(&bytes).expect("8 bytes must parse");

        // Assert
        assert_eq!(bytes[1], 0x00, "reserved byte must stay zero");
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_report_from_short_slice_is_none() {
        assert_eq!(KeyReport::from_bytes(&[0u8; 7]), None);
    }

    #[test]
    fn test_message_type_codes_round_trip() {
        for ty in [
            MessageType::Hello,
            MessageType::HelloAck,
            MessageType::Ping,
            MessageType::Pong,
            MessageType::Disconnect,
            MessageType::Report,
        ] {
            assert_eq!(MessageType::try_from(ty as u8), Ok(ty));
        }
        assert!(MessageType::try_from(0xFF).is_err());
    }
}
