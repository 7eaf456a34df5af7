//! Named USB HID Usage IDs (page 0x07) for keys that appear in macros.
//!
//! Macros name keys symbolically (`HidKey::Delete`, `HidKey::MetaLeft`);
//! arbitrary typed text bypasses this enum and travels as raw usage bytes
//! from the [`crate::keymap::ascii`] table. Only the keys the appliance can
//! name in a macro are enumerated here — the full usage page is not needed.
//!
//! Modifier keys (usages 0xE0–0xE7) are special on the wire: a boot-protocol
//! keyboard report carries them as a bitfield in byte 0 rather than as usage
//! bytes, one bit per modifier in usage order (bit 0 = Left Ctrl … bit 7 =
//! Right GUI). [`HidKey::modifier_bit`] exposes that mapping.

/// A key the appliance can name in a macro, identified by its HID Usage ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HidKey {
    // Letters (HID 0x04–0x1D)
    A = 0x04,
    B = 0x05,
    C = 0x06,
    D = 0x07,
    E = 0x08,
    F = 0x09,
    G = 0x0A,
    H = 0x0B,
    I = 0x0C,
    J = 0x0D,
    K = 0x0E,
    L = 0x0F,
    M = 0x10,
    N = 0x11,
    O = 0x12,
    P = 0x13,
    Q = 0x14,
    R = 0x15,
    S = 0x16,
    T = 0x17,
    U = 0x18,
    V = 0x19,
    W = 0x1A,
    X = 0x1B,
    Y = 0x1C,
    Z = 0x1D,

    // Digits (HID 0x1E–0x27)
    Digit1 = 0x1E,
    Digit2 = 0x1F,
    Digit3 = 0x20,
    Digit4 = 0x21,
    Digit5 = 0x22,
    Digit6 = 0x23,
    Digit7 = 0x24,
    Digit8 = 0x25,
    Digit9 = 0x26,
    Digit0 = 0x27,

    // Control keys
    Enter = 0x28,
    Escape = 0x29,
    Backspace = 0x2A,
    Tab = 0x2B,
    Space = 0x2C,
    Delete = 0x4C,

    // Modifiers (HID 0xE0–0xE7)
    ControlLeft = 0xE0,
    ShiftLeft = 0xE1,
    AltLeft = 0xE2,
    MetaLeft = 0xE3,
    ControlRight = 0xE4,
    ShiftRight = 0xE5,
    AltRight = 0xE6,
    MetaRight = 0xE7,
}

impl HidKey {
    /// Raw HID Usage ID on the keyboard/keypad page.
    pub fn usage(self) -> u8 {
        self as u8
    }

    /// Returns `true` for the eight modifier keys (usages 0xE0–0xE7).
    pub fn is_modifier(self) -> bool {
        self.usage() >= 0xE0
    }

    /// Boot-report modifier bitfield bit for this key, or `None` for
    /// ordinary keys. Bit position equals `usage − 0xE0`.
    pub fn modifier_bit(self) -> Option<u8> {
        if self.is_modifier() {
            Some(1 << (self.usage() - 0xE0))
        } else {
            None
        }
    }
}
