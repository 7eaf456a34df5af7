//! Physical button adapter.
//!
//! The appliance button is an active-low input with a pull-up, surfaced by
//! the kernel's `gpio-keys` driver as an evdev device. The classifier wants
//! a level, not edges, so the adapter queries the device's current key state
//! on every tick — the 50 ms sampling period is the debounce.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

/// Per-tick button level source.
pub trait ButtonSource: Send {
    /// The raw level sampled right now; `true` means pressed.
    fn is_pressed(&mut self) -> bool;
}

/// Errors opening the button device.
#[derive(Debug, Error)]
pub enum ButtonError {
    #[error("failed to open button device {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// evdev-backed button, Linux only.
#[cfg(target_os = "linux")]
pub struct EvdevButton {
    device: evdev::Device,
    key: evdev::Key,
}

#[cfg(target_os = "linux")]
impl EvdevButton {
    /// Opens the device and binds to one key code (e.g. `KEY_PROG1` for the
    /// usual gpio-keys mapping).
    pub fn open(path: &Path, key_code: u16) -> Result<Self, ButtonError> {
        let device = evdev::Device::open(path).map_err(|source| ButtonError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            device,
            key: evdev::Key::new(key_code),
        })
    }
}

#[cfg(target_os = "linux")]
impl ButtonSource for EvdevButton {
    fn is_pressed(&mut self) -> bool {
        match self.device.get_key_state() {
            Ok(state) => state.contains(self.key),
            Err(e) => {
                warn!("button state query failed: {e}");
                false
            }
        }
    }
}

/// Scripted button for tests: replays a fixed sequence of levels, repeating
/// the final level once the script runs out.
pub struct ScriptedButton {
    levels: Vec<bool>,
    cursor: usize,
}

impl ScriptedButton {
    pub fn new(levels: Vec<bool>) -> Self {
        Self { levels, cursor: 0 }
    }

    /// A button that is never pressed.
    pub fn idle() -> Self {
        Self::new(vec![false])
    }
}

impl ButtonSource for ScriptedButton {
    fn is_pressed(&mut self) -> bool {
        let level = self
            .levels
            .get(self.cursor)
            .or(self.levels.last())
            .copied()
            .unwrap_or(false);
        if self.cursor < self.levels.len() {
            self.cursor += 1;
        }
        level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_button_replays_levels_in_order() {
        let mut button = ScriptedButton::new(vec![false, true, true, false]);
        let sampled: Vec<bool> = (0..4).map(|_| button.is_pressed()).collect();
        assert_eq!(sampled, vec![false, true, true, false]);
    }

    #[test]
    fn test_scripted_button_repeats_final_level() {
        let mut button = ScriptedButton::new(vec![true]);
        assert!(button.is_pressed());
        assert!(button.is_pressed());
        assert!(button.is_pressed());
    }

    #[test]
    fn test_empty_script_reads_released() {
        let mut button = ScriptedButton::new(vec![]);
        assert!(!button.is_pressed());
    }
}
