//! Macros: named, ordered sequences of timed key actions.
//!
//! A macro is immutable once built. Each step either holds a chord of named
//! keys for a duration or transmits one chunk of literal text; after either,
//! all keys are released and an optional post-delay elapses before the next
//! step. The two built-in macros reproduce the appliance's fixed action set:
//! Ctrl+Alt+Del and the Windows power-menu sleep combo.

use std::time::Duration;

use crate::keymap::hid::HidKey;

/// Chunk size used for text typed through the remote `/type` command.
pub const TEXT_CHUNK_SIZE: usize = 4;

/// What a single step does while its keys are "down".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    /// Hold this set of keys simultaneously.
    Chord(Vec<HidKey>),
    /// Transmit one chunk of literal text, character by character.
    Text(String),
}

/// One timed step of a macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyStep {
    pub action: StepAction,
    /// How long the chord is held before release. Ignored for text steps —
    /// each character is pressed and released as it is typed.
    pub hold: Duration,
    /// Pause after release, before the next step starts.
    pub post_delay: Duration,
}

impl KeyStep {
    /// A chord step holding `keys` for `hold_ms`, then pausing `post_ms`.
    pub fn chord(keys: Vec<HidKey>, hold_ms: u64, post_ms: u64) -> Self {
        Self {
            action: StepAction::Chord(keys),
            hold: Duration::from_millis(hold_ms),
            post_delay: Duration::from_millis(post_ms),
        }
    }

    /// A text step transmitting `chunk`, then pausing `post_ms`.
    pub fn text(chunk: impl Into<String>, post_ms: u64) -> Self {
        Self {
            action: StepAction::Text(chunk.into()),
            hold: Duration::ZERO,
            post_delay: Duration::from_millis(post_ms),
        }
    }
}

/// A named, ordered sequence of [`KeyStep`]s. Defined at startup, never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
    pub name: String,
    pub steps: Vec<KeyStep>,
}

impl Macro {
    pub fn new(name: impl Into<String>, steps: Vec<KeyStep>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }

    /// Ctrl+Alt+Del: one chord held for 100 ms.
    pub fn ctrl_alt_del() -> Self {
        Self::new(
            "ctrlaltdel",
            vec![KeyStep::chord(
                vec![HidKey::ControlLeft, HidKey::AltLeft, HidKey::Delete],
                100,
                0,
            )],
        )
    }

    /// Win+X → U → S: opens the power-user menu, the shutdown submenu, then
    /// selects Sleep. Each chord is released immediately; the 500 ms pauses
    /// give the target time to open each menu.
    pub fn sleep_combo() -> Self {
        Self::new(
            "sleep",
            vec![
                KeyStep::chord(vec![HidKey::MetaLeft, HidKey::X], 0, 500),
                KeyStep::chord(vec![HidKey::U], 0, 500),
                KeyStep::chord(vec![HidKey::S], 0, 0),
            ],
        )
    }

    /// An ephemeral macro that types `msg` in fixed-size chunks.
    pub fn typed_text(msg: &str, chunk_size: usize) -> Self {
        let steps = chunk_text(msg, chunk_size)
            .into_iter()
            .map(|chunk| KeyStep::text(chunk, 0))
            .collect();
        Self::new("type", steps)
    }
}

/// Splits `msg` into chunks of at most `size` characters, preserving order.
///
/// Splitting is by character, not byte, so multi-byte UTF-8 input never
/// lands on an invalid boundary. A `size` of zero is treated as one.
pub fn chunk_text(msg: &str, size: usize) -> Vec<String> {
    let size = size.max(1);
    let chars: Vec<char> = msg.chars().collect();
    chars.chunks(size).map(|c| c.iter().collect()).collect()
}
