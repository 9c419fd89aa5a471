//! Angle and 2D transform helpers shared by the motion/observation models
//! and the estimator.
//!
//! All angles are in radians, counter-clockwise positive.

use nalgebra::{DMatrix, Matrix2, Vector2};
use std::f64::consts::{PI, TAU};

use crate::common::{Point2D, Pose2D};

/// Normalize angle to (-pi, pi].
///
/// Every angle difference in the crate goes through this function.
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    // rem_euclid may round up to TAU for tiny negative inputs
    let a = angle.rem_euclid(TAU);
    if a > PI {
        a - TAU
    } else {
        a
    }
}

/// Signed shortest rotation from `from` to `to`, in (-pi, pi]
#[inline]
pub fn angle_diff(from: f64, to: f64) -> f64 {
    normalize_angle(to - from)
}

/// 2x2 rotation matrix for `theta`
pub fn rotation(theta: f64) -> Matrix2<f64> {
    let (s, c) = theta.sin_cos();
    Matrix2::new(c, -s, s, c)
}

/// Express a point given in the robot frame in the global frame
pub fn local_to_global(pose: &Pose2D, local: &Point2D) -> Point2D {
    let p = rotation(pose.theta) * local.to_vector() + Vector2::new(pose.x, pose.y);
    Point2D::from(p)
}

/// Replace `m` with `(m + m^T) / 2`
pub fn symmetrize(m: &mut DMatrix<f64>) {
    let n = m.nrows();
    for i in 0..n {
        for j in (i + 1)..n {
            let avg = 0.5 * (m[(i, j)] + m[(j, i)]);
            m[(i, j)] = avg;
            m[(j, i)] = avg;
        }
    }
}

/// Largest absolute difference between `m` and its transpose
pub fn max_asymmetry(m: &DMatrix<f64>) -> f64 {
    (m - m.transpose()).amax()
}
