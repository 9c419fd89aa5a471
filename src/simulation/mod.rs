//! Simulated robot, sensor and world used to exercise the estimator
//!
//! Nothing here is part of the estimate: the simulator knows the true poses
//! and landmark positions and hands the estimator only commands and noisy
//! range-bearing observations.

pub mod history;
pub mod robot;
pub mod scenario;
pub mod world;

pub use history::SlamHistory;
pub use robot::{SimConfig, SimulatedRobot};
pub use scenario::{run_scenario, ScenarioConfig, ScenarioOutcome};
pub use world::LandmarkMap;
