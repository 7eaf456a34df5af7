//! Infrastructure layer: hardware and network adapters.
//!
//! Every adapter sits behind a trait owned by the application layer, and
//! every trait ships with an in-memory double, so nothing above this module
//! needs a button, an LED, a network interface, or a bridge peer to run.

pub mod button;
pub mod hid_link;
pub mod http_api;
pub mod indicator_pin;
pub mod link_probe;
