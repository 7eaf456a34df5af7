//! Domain model for the keyfob appliance.
//!
//! Pure business types with no infrastructure dependencies: the macro model
//! (named, ordered, timed key steps) and the command result taxonomy every
//! trigger path produces. Nothing here touches a socket, a clock, or a file,
//! which keeps the whole module unit-testable in isolation.

pub mod command;
pub mod macros;
