//! # Poller
//!
//! The fixed-interval loop that drives every cycle, and the gate that keeps
//! cycles from overlapping.

mod driver;
mod gate;

pub use driver::{Collaborators, CycleReport, PollDriver, TickOutcome};
pub use gate::{CycleGate, CyclePermit, DriverState};
