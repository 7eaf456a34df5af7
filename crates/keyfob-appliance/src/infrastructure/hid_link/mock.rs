//! Recording HID emitter for tests.
//!
//! Implements [`HidEmitter`] without any transport: every operation is
//! recorded, connectivity is a settable flag, and write failures can be
//! injected. Counters expose how often the capability was touched so tests
//! can assert an operation was *never* invoked.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use keyfob_core::HidKey;

use crate::application::run_macro::{EmitterError, HidEmitter};

/// One recorded emitter operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitterAction {
    Press(Vec<HidKey>),
    ReleaseAll,
    Text(String),
}

/// In-memory [`HidEmitter`] double.
#[derive(Default)]
pub struct MockEmitter {
    connected: AtomicBool,
    fail_writes: AtomicBool,
    actions: Mutex<Vec<EmitterAction>>,
    connect_checks: AtomicUsize,
    attempted_writes: AtomicUsize,
}

impl MockEmitter {
    pub fn new(connected: bool) -> Self {
        Self {
            connected: AtomicBool::new(connected),
            ..Self::default()
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Relaxed);
    }

    /// Makes every subsequent write return a transport error (the operation
    /// is still recorded as attempted).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// Everything successfully recorded, in order.
    pub fn actions(&self) -> Vec<EmitterAction> {
        self.actions.lock().unwrap().clone()
    }

    /// Concatenation of every transmitted text chunk.
    pub fn typed(&self) -> String {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                EmitterAction::Text(chunk) => Some(chunk),
                _ => None,
            })
            .collect()
    }

    /// How many times `is_connected` was consulted. The sequencer checks it
    /// exactly once per run, so a zero here proves it never ran.
    pub fn connect_checks(&self) -> usize {
        self.connect_checks.load(Ordering::Relaxed)
    }

    /// How many write operations were attempted, successful or not.
    pub fn attempted_writes(&self) -> usize {
        self.attempted_writes.load(Ordering::Relaxed)
    }

    fn write(&self, action: EmitterAction) -> Result<(), EmitterError> {
        self.attempted_writes.fetch_add(1, Ordering::Relaxed);
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(EmitterError::Transport("injected failure".to_string()));
        }
        self.actions.lock().unwrap().push(action);
        Ok(())
    }
}

#[async_trait]
impl HidEmitter for MockEmitter {
    fn is_connected(&self) -> bool {
        self.connect_checks.fetch_add(1, Ordering::Relaxed);
        self.connected.load(Ordering::Relaxed)
    }

    async fn press(&self, keys: &[HidKey]) -> Result<(), EmitterError> {
        self.write(EmitterAction::Press(keys.to_vec()))
    }

    async fn release_all(&self) -> Result<(), EmitterError> {
        self.write(EmitterAction::ReleaseAll)
    }

    async fn send_text(&self, chunk: &str) -> Result<(), EmitterError> {
        self.write(EmitterAction::Text(chunk.to_string()))
    }
}
