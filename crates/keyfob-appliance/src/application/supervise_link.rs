//! Link supervision: connectivity hysteresis and the indicator flash wave.
//!
//! The supervisor polls the link each tick. Transient blips never reach the
//! indicator: flashing starts only after a disconnection has persisted past
//! the fail threshold (60 s by default). While flashing, the indicator value
//! is recomputed statelessly every tick as `on ⟺ ⌊now / period⌋ even` — a
//! square wave anchored to wall-clock time rather than to the moment
//! flashing began, so the phase is reproducible across tick jitter and
//! restarts and no dedicated flash-phase timer is needed.
//!
//! Any connected tick closes the current disconnection episode; link
//! flapping inside the threshold window restarts the countdown.

use tracing::{info, warn};

/// What the supervisor wants done with the indicator this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorCommand {
    /// Drive the indicator to this value.
    Set(bool),
    /// The supervisor has no claim on the indicator this tick.
    NoChange,
}

/// Owned link state; mutated only through [`LinkSupervisor::on_tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkState {
    pub connected: bool,
    pub disconnected_since: Option<u64>,
    pub flashing: bool,
}

/// Tracks link health and computes the flash schedule.
pub struct LinkSupervisor {
    fail_threshold_ms: u64,
    flash_period_ms: u64,
    state: LinkState,
}

impl LinkSupervisor {
    pub fn new(fail_threshold_ms: u64, flash_period_ms: u64) -> Self {
        Self {
            fail_threshold_ms,
            flash_period_ms,
            // Starts optimistic: a first poll that reports the link down is a
            // transition and stamps disconnected_since.
            state: LinkState {
                connected: true,
                disconnected_since: None,
                flashing: false,
            },
        }
    }

    /// Advances the supervisor with this tick's link status.
    pub fn on_tick(&mut self, link_up: bool, now_ms: u64) -> IndicatorCommand {
        if link_up {
            let was_down = !self.state.connected;
            let was_flashing = self.state.flashing;
            self.state.connected = true;
            self.state.disconnected_since = None;
            self.state.flashing = false;
            if was_down {
                if was_flashing {
                    info!("link restored, stopping indicator flash");
                }
                // Reconnection clears the indicator regardless of flash phase.
                return IndicatorCommand::Set(false);
            }
            return IndicatorCommand::NoChange;
        }

        if self.state.connected {
            warn!(now_ms, "link lost");
            self.state.connected = false;
            self.state.disconnected_since = Some(now_ms);
        }

        if let Some(since) = self.state.disconnected_since {
            if !self.state.flashing && now_ms.saturating_sub(since) > self.fail_threshold_ms {
                warn!(
                    outage_ms = now_ms - since,
                    "link outage past fail threshold, flashing indicator"
                );
                self.state.flashing = true;
            }
        }

        if self.state.flashing {
            IndicatorCommand::Set((now_ms / self.flash_period_ms) % 2 == 0)
        } else {
            IndicatorCommand::NoChange
        }
    }

    /// Snapshot of the owned state, for the status endpoint.
    pub fn state(&self) -> LinkState {
        self.state
    }
}
