//! Per-step trajectory record for plotting and error reporting

use crate::common::{Point2D, Pose2D};
use crate::utils::geometry::angle_diff;

/// True, dead-reckoning and estimated poses, one entry per step
#[derive(Debug, Clone, Default)]
pub struct SlamHistory {
    pub truth: Vec<Pose2D>,
    pub dead_reckoning: Vec<Pose2D>,
    pub estimate: Vec<Pose2D>,
}

impl SlamHistory {
    /// History starting with all three tracks at `initial`
    pub fn new(initial: Pose2D) -> Self {
        Self {
            truth: vec![initial],
            dead_reckoning: vec![initial],
            estimate: vec![initial],
        }
    }

    pub fn record(&mut self, truth: Pose2D, dead_reckoning: Pose2D, estimate: Pose2D) {
        self.truth.push(truth);
        self.dead_reckoning.push(dead_reckoning);
        self.estimate.push(estimate);
    }

    pub fn len(&self) -> usize {
        self.truth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.truth.is_empty()
    }

    /// Final `(position error [m], heading error [rad])` of the estimate
    pub fn final_estimate_error(&self) -> Option<(f64, f64)> {
        final_error(&self.truth, &self.estimate)
    }

    /// Final `(position error [m], heading error [rad])` of dead reckoning
    pub fn final_dead_reckoning_error(&self) -> Option<(f64, f64)> {
        final_error(&self.truth, &self.dead_reckoning)
    }

    pub fn xy(track: &[Pose2D]) -> (Vec<f64>, Vec<f64>) {
        track.iter().map(|p| (p.x, p.y)).unzip()
    }
}

fn final_error(truth: &[Pose2D], other: &[Pose2D]) -> Option<(f64, f64)> {
    let t = truth.last()?;
    let o = other.last()?;
    Some((
        t.position().distance(&o.position()),
        angle_diff(t.theta, o.theta).abs(),
    ))
}

/// Split points into x and y coordinate vectors
pub fn point_xy(points: &[Point2D]) -> (Vec<f64>, Vec<f64>) {
    points.iter().map(|p| (p.x, p.y)).unzip()
}
