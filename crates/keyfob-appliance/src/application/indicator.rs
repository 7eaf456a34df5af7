//! Indicator driver: last-value wrapper around the LED pin.
//!
//! Pin writes are best-effort — a failed sysfs write is logged and the
//! appliance carries on. While the link supervisor is flashing, its per-tick
//! [`IndicatorCommand`] owns the LED; the remote `/led/toggle` command
//! applies at any other time (the next flash tick simply overwrites it).

use tracing::warn;

use crate::application::supervise_link::IndicatorCommand;

/// Binary output pin behind the indicator. Implementations: the sysfs LED
/// class adapter and an in-memory capture for tests.
pub trait IndicatorPin: Send {
    fn set(&mut self, on: bool) -> std::io::Result<()>;
}

/// Drives one indicator pin, remembering only the last commanded value.
pub struct IndicatorDriver {
    pin: Box<dyn IndicatorPin>,
    lit: bool,
}

impl IndicatorDriver {
    /// Takes ownership of the pin and drives it off to reach a known state.
    pub fn new(mut pin: Box<dyn IndicatorPin>) -> Self {
        if let Err(e) = pin.set(false) {
            warn!("indicator write failed at startup: {e}");
        }
        Self { pin, lit: false }
    }

    /// Drives the pin to `on`. Repeated identical values are not rewritten.
    pub fn set(&mut self, on: bool) {
        if on == self.lit {
            return;
        }
        if let Err(e) = self.pin.set(on) {
            warn!("indicator write failed: {e}");
        }
        self.lit = on;
    }

    /// Inverts the current value.
    pub fn toggle(&mut self) {
        self.set(!self.lit);
    }

    /// Applies a supervisor command.
    pub fn apply(&mut self, cmd: IndicatorCommand) {
        if let IndicatorCommand::Set(on) = cmd {
            self.set(on);
        }
    }

    /// Last commanded value.
    pub fn is_lit(&self) -> bool {
        self.lit
    }
}
