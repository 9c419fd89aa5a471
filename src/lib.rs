//! ekf_slam - Extended Kalman Filter SLAM for a planar robot
//!
//! This crate estimates a robot pose and a growing map of point landmarks
//! from velocity commands and range-bearing observations. The estimator in
//! [`slam`] is self-contained; [`simulation`] provides a noisy robot and
//! sensor to drive it, and [`settings`] loads both from TOML.

// Core modules
pub mod common;
pub mod utils;

// Algorithm modules
pub mod slam;

// Collaborators
pub mod settings;
pub mod simulation;

// Re-export common types for convenience
pub use common::{ControlInput, Observation, Point2D, Pose2D};
pub use common::{MotionModel, ObservationModel};
pub use common::{SlamError, SlamResult};
pub use slam::{EkfSlam, EkfSlamConfig};
