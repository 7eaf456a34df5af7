//! Press classification: one Short or Long event per physical press cycle.
//!
//! The raw button level is sampled at the tick period (50 ms); sampling at a
//! fixed period is the debounce — no separate debounce timer exists, the
//! value read at each tick is trusted.
//!
//! State machine per cycle:
//!
//! ```text
//! Idle ──falling edge──► Pressed(unclassified)
//!                            │ held ≥ threshold        → emit Long, stay held
//!                            │ released < threshold    → emit Short
//!                            ▼
//!                          Idle
//! ```
//!
//! `Long` fires exactly once, at the tick where the held duration first
//! reaches the threshold (inclusive comparison) — while the button is still
//! down, not at release. A release after `Long` emits nothing.

use tracing::debug;

/// Classified button event. At most one per press cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressEvent {
    Short,
    Long,
}

/// In-progress press cycle. Created on the falling edge, discarded on the
/// rising edge; `classified` latches once an event has been emitted.
struct PressCycle {
    pressed_at: u64,
    classified: bool,
}

/// Turns per-tick button levels into [`PressEvent`]s.
pub struct InputClassifier {
    long_press_ms: u64,
    was_pressed: bool,
    cycle: Option<PressCycle>,
}

impl InputClassifier {
    /// `long_press_ms` is the minimum held duration for a Long press.
    pub fn new(long_press_ms: u64) -> Self {
        Self {
            long_press_ms,
            was_pressed: false,
            cycle: None,
        }
    }

    /// Advances the classifier with the level sampled this tick.
    pub fn on_tick(&mut self, is_pressed: bool, now_ms: u64) -> Option<PressEvent> {
        let mut event = None;

        // Falling edge: a new press cycle begins.
        if is_pressed && !self.was_pressed {
            debug!(now_ms, "button down");
            self.cycle = Some(PressCycle {
                pressed_at: now_ms,
                classified: false,
            });
        }

        // While held: the only place Long can fire.
        if is_pressed {
            if let Some(cycle) = self.cycle.as_mut() {
                if !cycle.classified
                    && now_ms.saturating_sub(cycle.pressed_at) >= self.long_press_ms
                {
                    cycle.classified = true;
                    event = Some(PressEvent::Long);
                }
            }
        }

        // Rising edge: an unclassified short-enough hold becomes Short.
        if !is_pressed && self.was_pressed {
            if let Some(cycle) = self.cycle.take() {
                let held_ms = now_ms.saturating_sub(cycle.pressed_at);
                debug!(now_ms, held_ms, "button up");
                if !cycle.classified && held_ms < self.long_press_ms {
                    event = Some(PressEvent::Short);
                }
            }
        }

        self.was_pressed = is_pressed;
        event
    }
}
