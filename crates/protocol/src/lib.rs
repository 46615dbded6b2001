//! Wire protocol for the rover control link.
//!
//! Pure transforms from control intent to the textual command frames the
//! firmware understands. No I/O lives here.

pub mod command;
pub mod error;
pub mod motion;

pub use command::{encode_discrete, encode_stop, Command, DiscreteCommand};
pub use error::ProtocolError;
pub use motion::{encode_motion, map_axis, AxisSample};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
