//! Wire protocol between the appliance and the HID bridge peer.
//!
//! The appliance plays the keyboard; the peer (a small agent on the target
//! computer) replays the reports as local input. Messages are framed with a
//! fixed 8-byte big-endian header followed by a per-type payload — see
//! [`codec`] for the exact layout.

pub mod codec;
pub mod messages;
pub mod sequence;

pub use codec::{decode_message, encode_message, ProtocolError};
pub use messages::{BridgeMessage, HelloMessage, KeyReport, MessageType};
pub use sequence::SequenceCounter;
