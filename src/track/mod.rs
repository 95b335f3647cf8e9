//! Path tracking and crossing counting.
//!
//! `VehicleCounter` owns every live `Trajectory`. Per frame it links the new
//! detections to existing paths, seeds paths for the leftovers, trims each
//! path to its window, then counts and drops paths whose last step entered
//! an exit region.

mod counter;
mod trajectory;

pub use counter::{CounterSettings, Crossing, VehicleCounter};
pub use trajectory::Trajectory;
