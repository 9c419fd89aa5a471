//! Common types used throughout ekf_slam

use nalgebra::{Vector2, Vector3};

use crate::utils::geometry::normalize_angle;

/// 2D point representation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point2D {
    fn from(tuple: (f64, f64)) -> Self {
        Self {
            x: tuple.0,
            y: tuple.1,
        }
    }
}

impl From<[f64; 2]> for Point2D {
    fn from(a: [f64; 2]) -> Self {
        Self { x: a[0], y: a[1] }
    }
}

impl From<Vector2<f64>> for Point2D {
    fn from(v: Vector2<f64>) -> Self {
        Self { x: v[0], y: v[1] }
    }
}

/// 2D pose (position + heading)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta }
    }

    pub fn origin() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            theta: 0.0,
        }
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.theta)
    }

    /// Same pose with heading wrapped to (-pi, pi]
    pub fn normalized(&self) -> Self {
        Self {
            theta: normalize_angle(self.theta),
            ..*self
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.theta.is_finite()
    }
}

impl From<Vector3<f64>> for Pose2D {
    fn from(v: Vector3<f64>) -> Self {
        Self {
            x: v[0],
            y: v[1],
            theta: v[2],
        }
    }
}

impl From<[f64; 3]> for Pose2D {
    fn from(a: [f64; 3]) -> Self {
        Self {
            x: a[0],
            y: a[1],
            theta: a[2],
        }
    }
}

/// Velocity command for a differential drive robot, held for `dt` seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlInput {
    pub v: f64,     // linear velocity [m/s]
    pub omega: f64, // angular velocity [rad/s]
    pub dt: f64,    // duration [s]
}

impl ControlInput {
    pub fn new(v: f64, omega: f64, dt: f64) -> Self {
        Self { v, omega, dt }
    }

    pub fn zero(dt: f64) -> Self {
        Self {
            v: 0.0,
            omega: 0.0,
            dt,
        }
    }

    /// `(v, omega)` as a vector; `dt` is not part of the control space
    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.v, self.omega)
    }

    pub fn is_finite(&self) -> bool {
        self.v.is_finite() && self.omega.is_finite() && self.dt.is_finite()
    }
}

impl From<[f64; 3]> for ControlInput {
    fn from(a: [f64; 3]) -> Self {
        Self {
            v: a[0],
            omega: a[1],
            dt: a[2],
        }
    }
}

/// Range-bearing measurement in the robot frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Distance to the landmark [m]
    pub range: f64,
    /// Angle to the landmark relative to the robot heading [rad]
    pub bearing: f64,
}

impl Observation {
    pub fn new(range: f64, bearing: f64) -> Self {
        Self { range, bearing }
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.range, self.bearing)
    }

    /// Finite, non-negative range and finite bearing
    pub fn is_valid(&self) -> bool {
        self.range.is_finite() && self.range >= 0.0 && self.bearing.is_finite()
    }
}

impl From<Vector2<f64>> for Observation {
    fn from(v: Vector2<f64>) -> Self {
        Self {
            range: v[0],
            bearing: v[1],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_point2d_distance() {
        let p1 = Point2D::new(0.0, 0.0);
        let p2 = Point2D::new(3.0, 4.0);
        assert!((p1.distance(&p2) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_pose2d_normalized() {
        let pose = Pose2D::new(1.0, 2.0, 3.0 * PI).normalized();
        assert!(pose.theta > -PI && pose.theta <= PI);
        assert_eq!(pose.x, 1.0);
        assert_eq!(pose.y, 2.0);
    }

    #[test]
    fn test_observation_validity() {
        assert!(Observation::new(0.0, 0.0).is_valid());
        assert!(!Observation::new(-1.0, 0.0).is_valid());
        assert!(!Observation::new(1.0, f64::NAN).is_valid());
        assert!(!Observation::new(f64::INFINITY, 0.0).is_valid());
    }
}
