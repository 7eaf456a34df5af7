//! keyfob-appliance library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/` and
//! the binary entry point in `main.rs` share the same module tree.
//!
//! The appliance is a small box with one button, one status LED, and a
//! network port. A short press of the button sends Ctrl+Alt+Del to the
//! target computer over the HID bridge; a long press (two seconds or more)
//! walks the target's power menu to put it to sleep. The same actions — plus
//! arbitrary text typing — are reachable remotely over a tiny HTTP surface.
//! A link supervisor watches network health and flashes the LED once an
//! outage has persisted long enough to matter.

/// Application layer: the interacting state machines.
pub mod application;

/// Startup configuration (TOML, loaded once, immutable).
pub mod config;

/// Infrastructure layer: hardware and network adapters.
pub mod infrastructure;

/// The cooperative tick loop that wires everything together.
pub mod runtime;
