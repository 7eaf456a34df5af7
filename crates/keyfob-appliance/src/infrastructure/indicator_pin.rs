//! Indicator pin adapter: the sysfs LED class.
//!
//! The status LED is exposed by the kernel at
//! `/sys/class/leds/<name>/brightness`; writing `1`/`0` drives it. Failures
//! surface as `io::Error` to the driver, which logs and carries on — a dead
//! LED must never take the appliance down.

use std::path::PathBuf;

use crate::application::indicator::IndicatorPin;

/// Writes the LED class `brightness` attribute.
pub struct SysfsLedPin {
    brightness_path: PathBuf,
}

impl SysfsLedPin {
    pub fn new(brightness_path: impl Into<PathBuf>) -> Self {
        Self {
            brightness_path: brightness_path.into(),
        }
    }
}

impl IndicatorPin for SysfsLedPin {
    fn set(&mut self, on: bool) -> std::io::Result<()> {
        std::fs::write(&self.brightness_path, if on { "1" } else { "0" })
    }
}
