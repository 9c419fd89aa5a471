//! Common traits defining the models plugged into the estimator

use nalgebra::{Matrix2, Matrix2x3, Matrix3, Matrix3x2};

use crate::common::types::*;

/// Trait for robot motion models
pub trait MotionModel {
    /// Propagate the pose forward by one control command
    fn propagate(&self, pose: &Pose2D, control: &ControlInput) -> Pose2D;

    /// Jacobian of `propagate` with respect to the pose (3x3)
    fn jacobian_pose(&self, pose: &Pose2D, control: &ControlInput) -> Matrix3<f64>;

    /// Jacobian of `propagate` with respect to `(v, omega)` (3x2)
    fn jacobian_control(&self, pose: &Pose2D, control: &ControlInput) -> Matrix3x2<f64>;
}

/// Trait for landmark observation models
pub trait ObservationModel {
    /// Expected measurement of `landmark` seen from `pose`
    fn observe(&self, pose: &Pose2D, landmark: &Point2D) -> Observation;

    /// Jacobians of `observe` with respect to the pose (2x3) and the landmark (2x2)
    fn jacobian(&self, pose: &Pose2D, landmark: &Point2D) -> (Matrix2x3<f64>, Matrix2<f64>);

    /// Global landmark position implied by a measurement taken from `pose`
    fn inverse(&self, pose: &Pose2D, observation: &Observation) -> Point2D;

    /// Jacobians of `inverse` with respect to the pose (2x3) and the measurement (2x2)
    fn inverse_jacobian(
        &self,
        pose: &Pose2D,
        observation: &Observation,
    ) -> (Matrix2x3<f64>, Matrix2<f64>);
}
