//! Thread-safe sequence counter for outbound message numbering.
//!
//! Every framed message carries a monotonically increasing sequence number so
//! the bridge peer can spot drops and duplicates, and so Ping tokens can be
//! matched to their Pong. The counter is a lock-free atomic: the emitter's
//! write path and its keepalive task share one counter without contention.

use std::sync::atomic::{AtomicU32, Ordering};

/// Monotonically increasing counter; starts at 0, wraps at `u32::MAX`.
#[derive(Default)]
pub struct SequenceCounter {
    inner: AtomicU32,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next sequence number and advances the counter.
    ///
    /// Relaxed ordering is enough — the value orders messages, it does not
    /// synchronize memory between tasks.
    pub fn next(&self) -> u32 {
        self.inner.fetch_add(1, Ordering::Relaxed)
    }

    /// Current value without advancing; for logging only.
    pub fn current(&self) -> u32 {
        self.inner.load(Ordering::Relaxed)
    }
}
