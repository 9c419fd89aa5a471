//! Noise and association parameters for the EKF-SLAM estimator
//!
//! There is no `Default` for [`EkfSlamConfig`]: process noise, measurement
//! noise, gating and the initial pose uncertainty all change what the filter
//! believes, so callers spell them out (in code or in a TOML file).

use nalgebra::{Matrix2, Matrix3};
use serde::Deserialize;

use crate::common::{ControlInput, MotionModel, Pose2D, SlamError, SlamResult};

/// Process noise injected by each predict step
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ProcessNoise {
    /// Control-space noise whose standard deviation grows with the command:
    /// `sigma_v = linear_scale * |v| + linear_floor`, likewise for omega.
    /// Mapped into pose space through the motion model's control Jacobian.
    Proportional {
        linear_scale: f64,
        linear_floor: f64,
        angular_scale: f64,
        angular_floor: f64,
    },
    /// Constant pose-block variances added every predict
    Fixed { x: f64, y: f64, theta: f64 },
}

impl ProcessNoise {
    /// Pose-block process covariance for one command
    pub fn pose_covariance<M: MotionModel>(
        &self,
        model: &M,
        pose: &Pose2D,
        control: &ControlInput,
    ) -> Matrix3<f64> {
        match *self {
            ProcessNoise::Proportional {
                linear_scale,
                linear_floor,
                angular_scale,
                angular_floor,
            } => {
                let sigma_v = linear_scale * control.v.abs() + linear_floor;
                let sigma_w = angular_scale * control.omega.abs() + angular_floor;
                let m = Matrix2::new(sigma_v * sigma_v, 0.0, 0.0, sigma_w * sigma_w);
                let v = model.jacobian_control(pose, control);
                v * m * v.transpose()
            }
            ProcessNoise::Fixed { x, y, theta } => {
                Matrix3::from_diagonal(&nalgebra::Vector3::new(x, y, theta))
            }
        }
    }

    fn validate(&self) -> SlamResult<()> {
        match *self {
            ProcessNoise::Proportional {
                linear_scale,
                linear_floor,
                angular_scale,
                angular_floor,
            } => {
                non_negative("process_noise.linear_scale", linear_scale)?;
                non_negative("process_noise.linear_floor", linear_floor)?;
                non_negative("process_noise.angular_scale", angular_scale)?;
                non_negative("process_noise.angular_floor", angular_floor)
            }
            ProcessNoise::Fixed { x, y, theta } => {
                non_negative("process_noise.x", x)?;
                non_negative("process_noise.y", y)?;
                non_negative("process_noise.theta", theta)
            }
        }
    }
}

/// Range-bearing measurement noise (variances)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MeasurementNoise {
    /// [m^2]
    pub range_variance: f64,
    /// [rad^2]
    pub bearing_variance: f64,
}

impl MeasurementNoise {
    pub fn new(range_variance: f64, bearing_variance: f64) -> Self {
        Self {
            range_variance,
            bearing_variance,
        }
    }

    /// Measurement covariance `R`
    pub fn covariance(&self) -> Matrix2<f64> {
        Matrix2::new(self.range_variance, 0.0, 0.0, self.bearing_variance)
    }
}

/// Distance used to compare an observation against tracked landmarks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationMetric {
    /// Euclidean distance between the observation resolved into the global
    /// frame and each landmark estimate
    Euclidean,
    /// Mahalanobis distance of the innovation under the innovation covariance
    Mahalanobis,
}

impl Default for AssociationMetric {
    fn default() -> Self {
        AssociationMetric::Euclidean
    }
}

/// Data association policy
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AssociationConfig {
    #[serde(default)]
    pub metric: AssociationMetric,
    /// A candidate matches only if its distance is strictly below this gate
    /// ([m] for Euclidean, unitless for Mahalanobis)
    pub gate: f64,
}

impl AssociationConfig {
    pub fn euclidean(gate: f64) -> Self {
        Self {
            metric: AssociationMetric::Euclidean,
            gate,
        }
    }

    pub fn mahalanobis(gate: f64) -> Self {
        Self {
            metric: AssociationMetric::Mahalanobis,
            gate,
        }
    }
}

/// Form of the covariance update in the correct step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CovarianceUpdate {
    /// `P = (I - KH) P`
    Standard,
    /// `P = (I - KH) P (I - KH)^T + K R K^T`
    Joseph,
}

impl Default for CovarianceUpdate {
    fn default() -> Self {
        CovarianceUpdate::Standard
    }
}

/// Configuration for [`EkfSlam`](crate::slam::EkfSlam)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EkfSlamConfig {
    pub process_noise: ProcessNoise,
    pub measurement_noise: MeasurementNoise,
    pub association: AssociationConfig,
    /// Diagonal of the initial pose covariance `[x, y, theta]`
    pub initial_pose_variance: [f64; 3],
    /// Both forms are symmetrized afterwards
    #[serde(default)]
    pub covariance_update: CovarianceUpdate,
}

impl EkfSlamConfig {
    /// Reject negative or non-finite variances and non-positive gates
    pub fn validate(&self) -> SlamResult<()> {
        self.process_noise.validate()?;
        non_negative("measurement_noise.range_variance", self.measurement_noise.range_variance)?;
        non_negative("measurement_noise.bearing_variance", self.measurement_noise.bearing_variance)?;
        for (name, v) in ["x", "y", "theta"].iter().zip(self.initial_pose_variance.iter()) {
            non_negative(&format!("initial_pose_variance.{}", name), *v)?;
        }
        if !(self.association.gate.is_finite() && self.association.gate > 0.0) {
            return Err(SlamError::InvalidParameter(format!(
                "association.gate must be positive and finite, got {}",
                self.association.gate
            )));
        }
        Ok(())
    }
}

fn non_negative(name: &str, value: f64) -> SlamResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SlamError::InvalidParameter(format!(
            "{} must be finite and non-negative, got {}",
            name, value
        )))
    }
}
