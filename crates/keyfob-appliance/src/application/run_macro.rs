//! Macro execution against the HID emitter capability.
//!
//! The sequencer is deliberately synchronous from the tick loop's point of
//! view: `run` is awaited inline and the loop does not advance until the
//! macro completes. Macros last hundreds of milliseconds to a few seconds
//! and the appliance has a single physical operator, so blocking is the
//! simplicity/latency trade-off chosen here; the interface would equally
//! admit a deadline-per-step design without touching the dispatcher.
//!
//! Connectivity is checked exactly once, before the first step. If the
//! emitter drops mid-sequence, the remaining steps still attempt
//! transmission and per-step transport errors are logged, not propagated —
//! there is no retry and no partial-failure result.

use async_trait::async_trait;
use keyfob_core::{HidKey, Macro, StepAction};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Transport-level failure reported by an emitter operation.
#[derive(Debug, Error)]
pub enum EmitterError {
    #[error("bridge transport error: {0}")]
    Transport(String),
}

/// The wireless HID target capability.
///
/// The production implementation is the TCP bridge emitter in
/// `infrastructure::hid_link`; tests use the recording mock next to it.
#[async_trait]
pub trait HidEmitter: Send + Sync {
    /// Whether the HID target is currently reachable.
    fn is_connected(&self) -> bool;

    /// Holds this set of keys simultaneously (previous holds are replaced).
    async fn press(&self, keys: &[HidKey]) -> Result<(), EmitterError>;

    /// Releases every held key.
    async fn release_all(&self) -> Result<(), EmitterError>;

    /// Types one chunk of literal text.
    async fn send_text(&self, chunk: &str) -> Result<(), EmitterError>;
}

/// Sequencer failure: the precondition check found no HID target.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SequencerError {
    #[error("HID target not connected")]
    NotConnected,
}

/// Executes macros step by step. Owns no state between runs.
pub struct MacroSequencer;

impl MacroSequencer {
    pub fn new() -> Self {
        Self
    }

    /// Runs `m` to completion against `emitter`.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::NotConnected`] — with zero emitter side
    /// effects — if the target is unreachable at the precondition check.
    pub async fn run(&self, m: &Macro, emitter: &dyn HidEmitter) -> Result<(), SequencerError> {
        if !emitter.is_connected() {
            return Err(SequencerError::NotConnected);
        }

        debug!(name = %m.name, steps = m.steps.len(), "running macro");
        for step in &m.steps {
            match &step.action {
                StepAction::Chord(keys) => {
                    if let Err(e) = emitter.press(keys).await {
                        warn!(name = %m.name, "press failed: {e}");
                    }
                    if !step.hold.is_zero() {
                        sleep(step.hold).await;
                    }
                }
                StepAction::Text(chunk) => {
                    if let Err(e) = emitter.send_text(chunk).await {
                        warn!(name = %m.name, "text transmission failed: {e}");
                    }
                }
            }
            // Releasing after every step is mandatory, including after the
            // final text chunk.
            if let Err(e) = emitter.release_all().await {
                warn!(name = %m.name, "release failed: {e}");
            }
            if !step.post_delay.is_zero() {
                sleep(step.post_delay).await;
            }
        }
        Ok(())
    }
}

impl Default for MacroSequencer {
    fn default() -> Self {
        Self::new()
    }
}
