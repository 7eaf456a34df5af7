//! Key code tables.
//!
//! The canonical key representation throughout keyfob is the USB HID Usage
//! ID (page 0x07, Keyboard/Keypad page) — the same numbering a hardware
//! keyboard puts on the wire, so the bridge peer can replay reports without
//! any translation table of its own.

pub mod ascii;
pub mod hid;
