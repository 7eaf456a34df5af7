//! # keyfob-core
//!
//! Shared library for the keyfob remote-trigger appliance: the macro domain
//! model, command result types, HID key tables, and the wire protocol spoken
//! to the HID bridge peer on the target computer.
//!
//! This crate is pure data and logic. It has zero dependencies on OS APIs,
//! network sockets, or the async runtime, so every type in it can be unit
//! tested on any platform without hardware attached.
//!
//! - **`domain`** – macros (named, ordered, timed key steps), text chunking,
//!   and the command result taxonomy shared by every trigger path.
//! - **`keymap`** – named USB HID Usage IDs (page 0x07) plus the ASCII
//!   character table used when typing arbitrary text.
//! - **`protocol`** – the framed binary protocol that carries boot-protocol
//!   keyboard reports from the appliance to the bridge peer.

pub mod domain;
pub mod keymap;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `keyfob_core::Macro` instead of `keyfob_core::domain::macros::Macro`.
pub use domain::command::{CommandOutcome, CommandResult, TriggerSource};
pub use domain::macros::{chunk_text, KeyStep, Macro, StepAction};
pub use keymap::hid::HidKey;
pub use protocol::codec::{decode_message, encode_message, ProtocolError};
pub use protocol::messages::{BridgeMessage, KeyReport};
