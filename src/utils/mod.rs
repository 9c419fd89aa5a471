//! Utility modules for ekf_slam

pub mod geometry;
pub mod visualization;

pub use geometry::{normalize_angle, symmetrize};
pub use visualization::{colors, PathStyle, PointStyle, SlamPlot};
