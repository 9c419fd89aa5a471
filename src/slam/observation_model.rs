//! Range-bearing observation model and its inverse

use nalgebra::{Matrix2, Matrix2x3};

use crate::common::{Observation, ObservationModel, Point2D, Pose2D};
use crate::utils::geometry::{local_to_global, normalize_angle};

/// Range-bearing sensor mounted at the robot origin, aligned with its heading
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeBearingModel;

impl RangeBearingModel {
    pub fn new() -> Self {
        RangeBearingModel
    }
}

impl ObservationModel for RangeBearingModel {
    fn observe(&self, pose: &Pose2D, landmark: &Point2D) -> Observation {
        let dx = landmark.x - pose.x;
        let dy = landmark.y - pose.y;
        Observation::new(dx.hypot(dy), normalize_angle(dy.atan2(dx) - pose.theta))
    }

    /// Undefined (non-finite) when the landmark coincides with the robot
    fn jacobian(&self, pose: &Pose2D, landmark: &Point2D) -> (Matrix2x3<f64>, Matrix2<f64>) {
        let dx = landmark.x - pose.x;
        let dy = landmark.y - pose.y;
        let d2 = dx * dx + dy * dy;
        let d = d2.sqrt();

        let h_pose = Matrix2x3::new(
            -dx / d, -dy / d, 0.0,
            dy / d2, -dx / d2, -1.0,
        );
        let h_landmark = Matrix2::new(
            dx / d, dy / d,
            -dy / d2, dx / d2,
        );

        (h_pose, h_landmark)
    }

    fn inverse(&self, pose: &Pose2D, observation: &Observation) -> Point2D {
        let (s, c) = observation.bearing.sin_cos();
        local_to_global(pose, &Point2D::new(observation.range * c, observation.range * s))
    }

    fn inverse_jacobian(
        &self,
        pose: &Pose2D,
        observation: &Observation,
    ) -> (Matrix2x3<f64>, Matrix2<f64>) {
        let r = observation.range;
        let (s, c) = (pose.theta + observation.bearing).sin_cos();

        let g_pose = Matrix2x3::new(
            1.0, 0.0, -r * s,
            0.0, 1.0, r * c,
        );
        let g_obs = Matrix2::new(
            c, -r * s,
            s, r * c,
        );

        (g_pose, g_obs)
    }
}
