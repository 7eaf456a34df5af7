//! Application layer: the appliance's interacting state machines.
//!
//! Each component owns its state exclusively and is advanced only through
//! its own tick or run method, with the current time passed in as a plain
//! millisecond value — no component reads the clock or touches hardware
//! directly, which is what makes the scenario tests in `tests/` possible
//! without a button, an LED, or a network.
//!
//! - [`classify_press`] – turns raw button levels into one Short/Long event
//!   per press cycle.
//! - [`supervise_link`] – connectivity hysteresis and the flash schedule.
//! - [`run_macro`] – executes timed key sequences against the HID emitter
//!   capability.
//! - [`dispatch_command`] – the single name→macro mapping both trigger
//!   paths go through, with authorization on the remote path.
//! - [`indicator`] – last-value wrapper around the LED pin.

pub mod classify_press;
pub mod dispatch_command;
pub mod indicator;
pub mod run_macro;
pub mod supervise_link;
