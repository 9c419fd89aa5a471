//! Velocity motion model for a differential drive robot
//!
//! A command `(v, omega)` held for `dt` moves the robot along a circular arc
//! of radius `v / omega`, or along a straight line when `omega` is zero.
//!
//! Reference: Probabilistic Robotics (Thrun, Burgard, Fox), chapter 5.3

use nalgebra::{Matrix3, Matrix3x2};

use crate::common::{ControlInput, MotionModel, Pose2D};
use crate::utils::geometry::normalize_angle;

/// Angular velocities below this magnitude use the straight-line branch
pub const ANGULAR_EPS: f64 = 1e-9;

/// Exact-integration velocity motion model
#[derive(Debug, Clone, Copy, Default)]
pub struct VelocityMotionModel;

impl VelocityMotionModel {
    pub fn new() -> Self {
        VelocityMotionModel
    }

    fn is_straight(control: &ControlInput) -> bool {
        control.omega.abs() < ANGULAR_EPS
    }
}

impl MotionModel for VelocityMotionModel {
    fn propagate(&self, pose: &Pose2D, control: &ControlInput) -> Pose2D {
        let (v, w, dt) = (control.v, control.omega, control.dt);
        let theta = pose.theta;

        if Self::is_straight(control) {
            return Pose2D::new(
                pose.x + v * dt * theta.cos(),
                pose.y + v * dt * theta.sin(),
                normalize_angle(theta),
            );
        }

        let r = v / w;
        let theta_new = theta + w * dt;
        Pose2D::new(
            pose.x - r * theta.sin() + r * theta_new.sin(),
            pose.y + r * theta.cos() - r * theta_new.cos(),
            normalize_angle(theta_new),
        )
    }

    fn jacobian_pose(&self, pose: &Pose2D, control: &ControlInput) -> Matrix3<f64> {
        let (v, w, dt) = (control.v, control.omega, control.dt);
        let theta = pose.theta;

        let (dx_dtheta, dy_dtheta) = if Self::is_straight(control) {
            (-v * dt * theta.sin(), v * dt * theta.cos())
        } else {
            let r = v / w;
            let theta_new = theta + w * dt;
            (
                -r * theta.cos() + r * theta_new.cos(),
                -r * theta.sin() + r * theta_new.sin(),
            )
        };

        Matrix3::new(
            1.0, 0.0, dx_dtheta,
            0.0, 1.0, dy_dtheta,
            0.0, 0.0, 1.0,
        )
    }

    fn jacobian_control(&self, pose: &Pose2D, control: &ControlInput) -> Matrix3x2<f64> {
        let (v, w, dt) = (control.v, control.omega, control.dt);
        let theta = pose.theta;
        let (s, c) = theta.sin_cos();

        if Self::is_straight(control) {
            // limit of the arc derivatives as omega -> 0
            return Matrix3x2::new(
                dt * c, -0.5 * v * dt * dt * s,
                dt * s, 0.5 * v * dt * dt * c,
                0.0, dt,
            );
        }

        let (s1, c1) = (theta + w * dt).sin_cos();
        let w2 = w * w;
        Matrix3x2::new(
            (s1 - s) / w, v * (s - s1) / w2 + v * c1 * dt / w,
            (c - c1) / w, -v * (c - c1) / w2 + v * s1 * dt / w,
            0.0, dt,
        )
    }
}
