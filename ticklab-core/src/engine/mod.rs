//! Simulation driver — tick merging and the sequential market loop.

mod merge;
mod simulation;

pub use merge::merge_ticks;
pub use simulation::{RunResult, Simulation, SimulationError};
