//! Simulated robot with noisy motion and a limited range-bearing sensor
//!
//! The robot executes commands with a systematic proportional bias plus a
//! uniform proportional jitter, and senses every landmark inside its field of
//! view and maximum range.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::Deserialize;
use std::f64::consts::PI;

use crate::common::{
    ControlInput, MotionModel, Observation, ObservationModel, Point2D, Pose2D, SlamError,
    SlamResult,
};
use crate::slam::{RangeBearingModel, VelocityMotionModel};
use crate::utils::geometry::normalize_angle;

use super::world::LandmarkMap;

fn default_half_fov() -> f64 {
    3.0 * PI / 4.0
}

/// Simulator noise and sensor parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimConfig {
    /// Execute commands exactly when false
    pub use_noise: bool,
    /// Systematic proportional error on `[v, omega]`
    pub control_bias: [f64; 2],
    /// Uniform proportional jitter: adds `U[0, 1) * jitter * command`
    pub control_jitter: f64,
    /// [m]
    pub sensor_max_range: f64,
    /// Visible bearings are `[-half_fov, half_fov]` [rad]
    #[serde(default = "default_half_fov")]
    pub sensor_half_fov: f64,
    /// [m]
    pub range_noise_std: f64,
    /// [rad]
    pub bearing_noise_std: f64,
    pub seed: u64,
}

impl SimConfig {
    /// Noise-free robot with an unlimited 360 degree sensor
    pub fn noiseless() -> Self {
        Self {
            use_noise: false,
            control_bias: [0.0, 0.0],
            control_jitter: 0.0,
            sensor_max_range: f64::INFINITY,
            sensor_half_fov: PI,
            range_noise_std: 0.0,
            bearing_noise_std: 0.0,
            seed: 0,
        }
    }
}

/// Ground-truth robot
#[derive(Debug, Clone)]
pub struct SimulatedRobot {
    pose: Pose2D,
    config: SimConfig,
    motion: VelocityMotionModel,
    sensor: RangeBearingModel,
    range_noise: Normal<f64>,
    bearing_noise: Normal<f64>,
    rng: StdRng,
}

impl SimulatedRobot {
    pub fn new(pose: Pose2D, config: SimConfig) -> SlamResult<Self> {
        let range_noise = Normal::new(0.0, config.range_noise_std).map_err(|e| {
            SlamError::InvalidParameter(format!("simulation.range_noise_std: {}", e))
        })?;
        let bearing_noise = Normal::new(0.0, config.bearing_noise_std).map_err(|e| {
            SlamError::InvalidParameter(format!("simulation.bearing_noise_std: {}", e))
        })?;
        if config.sensor_max_range.is_nan() || config.sensor_max_range <= 0.0 {
            return Err(SlamError::InvalidParameter(format!(
                "simulation.sensor_max_range must be positive, got {}",
                config.sensor_max_range
            )));
        }

        Ok(Self {
            pose: pose.normalized(),
            rng: StdRng::seed_from_u64(config.seed),
            config,
            motion: VelocityMotionModel::new(),
            sensor: RangeBearingModel::new(),
            range_noise,
            bearing_noise,
        })
    }

    /// True pose
    pub fn pose(&self) -> Pose2D {
        self.pose
    }

    pub fn set_pose(&mut self, pose: Pose2D) {
        self.pose = pose.normalized();
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Command actually executed for `control`
    pub fn apply_control_noise(&mut self, control: &ControlInput) -> ControlInput {
        if !self.config.use_noise {
            return *control;
        }
        let jitter_v = self.rng.gen::<f64>() * self.config.control_jitter * control.v;
        let jitter_w = self.rng.gen::<f64>() * self.config.control_jitter * control.omega;
        ControlInput::new(
            control.v + self.config.control_bias[0] * control.v + jitter_v,
            control.omega + self.config.control_bias[1] * control.omega + jitter_w,
            control.dt,
        )
    }

    /// Move the true robot; returns the executed command
    pub fn step(&mut self, control: &ControlInput) -> ControlInput {
        let executed = self.apply_control_noise(control);
        self.pose = self.motion.propagate(&self.pose, &executed);
        executed
    }

    pub fn is_visible(&self, landmark: &Point2D) -> bool {
        let z = self.sensor.observe(&self.pose, landmark);
        z.bearing.abs() <= self.config.sensor_half_fov && z.range < self.config.sensor_max_range
    }

    /// Noisy observations of every visible landmark, in map order
    pub fn observe(&mut self, map: &LandmarkMap) -> Vec<Observation> {
        let visible: Vec<Point2D> = map
            .iter()
            .filter(|lm| self.is_visible(lm))
            .copied()
            .collect();

        visible
            .iter()
            .map(|lm| {
                let z = self.sensor.observe(&self.pose, lm);
                if self.config.use_noise {
                    let range = (z.range + self.range_noise.sample(&mut self.rng)).max(0.0);
                    let bearing = normalize_angle(z.bearing + self.bearing_noise.sample(&mut self.rng));
                    Observation::new(range, bearing)
                } else {
                    z
                }
            })
            .collect()
    }
}
