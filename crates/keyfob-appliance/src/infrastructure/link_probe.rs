//! Network link probe.
//!
//! The link supervisor only needs a boolean per tick. On Linux the kernel
//! publishes interface state at `/sys/class/net/<if>/operstate`; the probe
//! reads it and treats anything other than `up` — including a read failure —
//! as down. Reconnecting the link itself is the OS's business, not ours.

use std::path::PathBuf;

use tracing::debug;

/// Per-tick link status source.
pub trait LinkProbe: Send {
    /// Whether the network link is up right now.
    fn is_up(&mut self) -> bool;
}

/// Reads the interface operstate file.
pub struct OperstateProbe {
    path: PathBuf,
}

impl OperstateProbe {
    /// Probes the named interface (e.g. `wlan0`).
    pub fn new(interface: &str) -> Self {
        Self {
            path: PathBuf::from(format!("/sys/class/net/{interface}/operstate")),
        }
    }
}

impl LinkProbe for OperstateProbe {
    fn is_up(&mut self) -> bool {
        match std::fs::read_to_string(&self.path) {
            Ok(state) => state.trim() == "up",
            Err(e) => {
                debug!("operstate read failed ({}): {e}", self.path.display());
                false
            }
        }
    }
}

/// Scripted probe for tests: replays a fixed sequence of link states,
/// repeating the final one once the script runs out.
pub struct ScriptedProbe {
    states: Vec<bool>,
    cursor: usize,
}

impl ScriptedProbe {
    pub fn new(states: Vec<bool>) -> Self {
        Self { states, cursor: 0 }
    }

    /// A link that is always up.
    pub fn steady() -> Self {
        Self::new(vec![true])
    }
}

impl LinkProbe for ScriptedProbe {
    fn is_up(&mut self) -> bool {
        let state = self
            .states
            .get(self.cursor)
            .or(self.states.last())
            .copied()
            .unwrap_or(false);
        if self.cursor < self.states.len() {
            self.cursor += 1;
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operstate_up_means_link_up() {
        // Arrange: a temp file standing in for the operstate attribute
        let dir = std::env::temp_dir();
        let path = dir.join(format!("keyfob_operstate_{}", std::process::id()));
        std::fs::write(&path, "up\n").unwrap();

        let mut probe = OperstateProbe {
            path: path.clone(),
        };

        // Act / Assert
        assert!(probe.is_up());
        std::fs::write(&path, "down\n").unwrap();
        assert!(!probe.is_up());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_interface_reads_down() {
        let mut probe = OperstateProbe::new("does-not-exist0");
        assert!(!probe.is_up());
    }

    #[test]
    fn test_scripted_probe_replays_then_holds() {
        let mut probe = ScriptedProbe::new(vec![true, false]);
        assert!(probe.is_up());
        assert!(!probe.is_up());
        assert!(!probe.is_up(), "final state repeats");
    }
}
