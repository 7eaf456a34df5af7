//! Integration tests for the bridge protocol through the public API:
//! codec, message types, and sequence counter working together.

use keyfob_core::{
    decode_message, encode_message,
    protocol::{
        messages::{HelloMessage, PROTOCOL_VERSION},
        sequence::SequenceCounter,
    },
    BridgeMessage, HidKey, KeyReport, ProtocolError,
};
use uuid::Uuid;

fn roundtrip(msg: BridgeMessage) -> BridgeMessage {
    let counter = SequenceCounter::new();
    let bytes = encode_message(&msg, counter.next());
    let (decoded, consumed) = decode_message(&bytes).expect("decode must succeed");
    assert_eq!(consumed, bytes.len(), "all bytes must be consumed");
    decoded
}

#[test]
fn test_hello_handshake_messages_round_trip() {
    let hello = BridgeMessage::Hello(HelloMessage {
        appliance_id: Uuid::new_v4(),
        appliance_name: "desk-fob".to_string(),
        protocol_version: PROTOCOL_VERSION,
    });
    assert_eq!(roundtrip(hello.clone()), hello);
    assert_eq!(
        roundtrip(BridgeMessage::HelloAck { accepted: true }),
        BridgeMessage::HelloAck { accepted: true }
    );
}

#[test]
fn test_chord_report_survives_the_wire() {
    // The report a ctrlaltdel step produces
    let report = KeyReport::from_keys(&[HidKey::ControlLeft, HidKey::AltLeft, HidKey::Delete]);
    match roundtrip(BridgeMessage::Report(report)) {
        BridgeMessage::Report(decoded) => {
            assert_eq!(decoded.modifiers, report.modifiers);
            assert_eq!(decoded.keys, report.keys);
        }
        other => panic!("expected Report, got {other:?}"),
    }
}

#[test]
fn test_release_report_survives_the_wire() {
    let decoded = roundtrip(BridgeMessage::Report(KeyReport::released()));
    assert!(matches!(decoded, BridgeMessage::Report(r) if r.is_release()));
}

#[test]
fn test_keepalive_tokens_match() {
    assert_eq!(roundtrip(BridgeMessage::Ping(77)), BridgeMessage::Ping(77));
    assert_eq!(roundtrip(BridgeMessage::Pong(77)), BridgeMessage::Pong(77));
}

#[test]
fn test_garbage_bytes_yield_typed_errors_not_panics() {
    // Arrange: a buffer that is valid up to the header version byte only
    let garbage = [0xFFu8; 16];

    // Act
    let result = decode_message(&garbage);

    // Assert
    assert!(matches!(
        result,
        Err(ProtocolError::UnsupportedVersion(0xFF))
    ));
}

#[test]
fn test_typing_session_stream_decodes_message_by_message() {
    // Arrange: the report stream `send_text("Hi")` produces — press/release
    // pairs per character, Shift carried in the modifier bitfield.
    let counter = SequenceCounter::new();
    let reports = [
        KeyReport::from_usage(0x0B, true), // H
        KeyReport::released(),
        KeyReport::from_usage(0x0C, false), // i
        KeyReport::released(),
    ];
    let mut stream = Vec::new();
    for report in reports {
        stream.extend(encode_message(
            &BridgeMessage::Report(report),
            counter.next(),
        ));
    }

    // Act: decode the way a stream reader would
    let mut cursor = 0;
    let mut decoded = Vec::new();
    while cursor < stream.len() {
        let (msg, consumed) = decode_message(&stream[cursor..]).expect("stream must decode");
        decoded.push(msg);
        cursor += consumed;
    }

    // Assert: order preserved, alternating press/release
    assert_eq!(decoded.len(), 4);
    assert!(matches!(&decoded[0], BridgeMessage::Report(r) if r.keys[0] == 0x0B));
    assert!(matches!(&decoded[1], BridgeMessage::Report(r) if r.is_release()));
    assert!(matches!(&decoded[3], BridgeMessage::Report(r) if r.is_release()));
}
