// EKF SLAM (Extended Kalman Filter SLAM)
// author: Atsushi Sakai (@Atsushi_twi)
//         Ryohei Sasaki (@rsasaki0109)
//         Rust port
//
// Reference:
// - Probabilistic Robotics (Thrun, Burgard, Fox)
// - https://github.com/AtsushiSakai/PythonRobotics

//! Joint estimation of the robot pose and an unbounded set of point landmarks.
//!
//! State vector: `[x, y, theta, lm0_x, lm0_y, lm1_x, lm1_y, ...]`. Landmark `i`
//! always lives at offset `3 + 2 * i`; landmarks are never removed, so an
//! index handed out by [`EkfSlam::augment`] stays valid for the lifetime of
//! the estimator.
//!
//! Each cycle: [`EkfSlam::predict`] with the control, then for every
//! observation [`EkfSlam::associate`], [`EkfSlam::augment`] when unmatched,
//! and [`EkfSlam::correct`]. [`EkfSlam::step`] runs the whole cycle.

use nalgebra::{DMatrix, DVector, Matrix2, Matrix3, Vector2};
use tracing::{debug, trace};

use crate::common::{
    ControlInput, MotionModel, Observation, ObservationModel, Point2D, Pose2D, SlamError,
    SlamResult,
};
use crate::utils::geometry::{angle_diff, normalize_angle, symmetrize};

use super::augmentation::{augmented, LandmarkInit};
use super::config::{AssociationMetric, CovarianceUpdate, EkfSlamConfig};
use super::data_association::{associate_euclidean, nearest_within_gate};
use super::motion_model::VelocityMotionModel;
use super::observation_model::RangeBearingModel;

// State dimension
pub const STATE_SIZE: usize = 3; // robot state [x, y, theta]
pub const LM_SIZE: usize = 2; // landmark state [x, y]

/// Relative determinant `|det S| / (S00 * S11)` at or below which the
/// innovation covariance is treated as singular
pub const SINGULARITY_EPS: f64 = 1e-12;

/// How one observation was incorporated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationOutcome {
    /// Landmark index the observation was applied to
    pub index: usize,
    /// The landmark was created from this observation
    pub is_new: bool,
}

/// Observation whose correct step hit a singular innovation covariance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkippedObservation {
    pub observation: Observation,
    pub index: usize,
    pub is_new: bool,
    pub determinant: f64,
}

/// Result of a full [`EkfSlam::step`]
#[derive(Debug, Clone, Default)]
pub struct StepReport {
    pub corrected: Vec<ObservationOutcome>,
    pub skipped: Vec<SkippedObservation>,
}

impl StepReport {
    pub fn new_landmarks(&self) -> usize {
        self.corrected.iter().filter(|o| o.is_new).count()
            + self.skipped.iter().filter(|o| o.is_new).count()
    }
}

/// Linearized measurement of one landmark
struct Innovation {
    /// observed - expected, bearing wrapped
    y: Vector2<f64>,
    /// 2 x n measurement Jacobian
    h: DMatrix<f64>,
    s: Matrix2<f64>,
}

/// EKF SLAM estimator; sole owner of the state vector and covariance
#[derive(Debug, Clone)]
pub struct EkfSlam {
    x: DVector<f64>,
    p: DMatrix<f64>,
    config: EkfSlamConfig,
    motion: VelocityMotionModel,
    sensor: RangeBearingModel,
}

impl EkfSlam {
    /// Create an estimator at `initial_pose` with no landmarks
    pub fn new(initial_pose: Pose2D, config: EkfSlamConfig) -> SlamResult<Self> {
        config.validate()?;
        if !initial_pose.is_finite() {
            return Err(SlamError::InvalidParameter(format!(
                "initial pose must be finite, got {:?}",
                initial_pose
            )));
        }

        let pose = initial_pose.normalized();
        let x = DVector::from_column_slice(pose.to_vector().as_slice());
        let p = DMatrix::from_diagonal(&DVector::from_column_slice(&config.initial_pose_variance));

        debug!(x = pose.x, y = pose.y, theta = pose.theta, "EKF SLAM initialized");
        Ok(EkfSlam {
            x,
            p,
            config,
            motion: VelocityMotionModel::new(),
            sensor: RangeBearingModel::new(),
        })
    }

    pub fn config(&self) -> &EkfSlamConfig {
        &self.config
    }

    /// Full state vector `[x, y, theta, lm0_x, lm0_y, ...]`
    pub fn state(&self) -> &DVector<f64> {
        &self.x
    }

    /// Full state covariance
    pub fn covariance(&self) -> &DMatrix<f64> {
        &self.p
    }

    pub fn pose(&self) -> Pose2D {
        Pose2D::new(self.x[0], self.x[1], self.x[2])
    }

    pub fn pose_covariance(&self) -> Matrix3<f64> {
        self.p.fixed_view::<STATE_SIZE, STATE_SIZE>(0, 0).into_owned()
    }

    pub fn landmark_count(&self) -> usize {
        (self.x.len() - STATE_SIZE) / LM_SIZE
    }

    /// Landmark position by index
    pub fn landmark(&self, index: usize) -> Option<Point2D> {
        if index < self.landmark_count() {
            let i = lm_offset(index);
            Some(Point2D::new(self.x[i], self.x[i + 1]))
        } else {
            None
        }
    }

    /// 2x2 covariance block of one landmark
    pub fn landmark_covariance(&self, index: usize) -> Option<Matrix2<f64>> {
        if index < self.landmark_count() {
            let i = lm_offset(index);
            Some(self.p.fixed_view::<LM_SIZE, LM_SIZE>(i, i).into_owned())
        } else {
            None
        }
    }

    /// All landmark estimates in index order
    pub fn landmarks(&self) -> Vec<Point2D> {
        self.x.as_slice()[STATE_SIZE..]
            .chunks_exact(LM_SIZE)
            .map(|c| Point2D::new(c[0], c[1]))
            .collect()
    }

    /// Motion update. Landmarks and their covariance blocks are unchanged.
    pub fn predict(&mut self, control: &ControlInput) -> SlamResult<()> {
        self.check_dimensions()?;
        validate_control(control)?;

        let pose = self.pose();
        let g = self.motion.jacobian_pose(&pose, control);
        let q = self
            .config
            .process_noise
            .pose_covariance(&self.motion, &pose, control);
        let new_pose = self.motion.propagate(&pose, control);

        // P = F P F^T + Q with F = diag(G, I):
        //   P_rr = G P_rr G^T + Q, P_rm = G P_rm, P_mm unchanged
        let n = self.x.len();
        let m = n - STATE_SIZE;
        let p_rr = g * self.p.fixed_view::<STATE_SIZE, STATE_SIZE>(0, 0) * g.transpose() + q;
        let p_rr = (p_rr + p_rr.transpose()) * 0.5;
        let p_rm = g * self.p.view((0, STATE_SIZE), (STATE_SIZE, m));

        self.p
            .fixed_view_mut::<STATE_SIZE, STATE_SIZE>(0, 0)
            .copy_from(&p_rr);
        self.p
            .view_mut((0, STATE_SIZE), (STATE_SIZE, m))
            .copy_from(&p_rm);
        self.p
            .view_mut((STATE_SIZE, 0), (m, STATE_SIZE))
            .copy_from(&p_rm.transpose());

        self.x[0] = new_pose.x;
        self.x[1] = new_pose.y;
        self.x[2] = new_pose.theta;

        trace!(
            v = control.v,
            omega = control.omega,
            dt = control.dt,
            x = new_pose.x,
            y = new_pose.y,
            theta = new_pose.theta,
            "predict"
        );
        Ok(())
    }

    /// Match an observation to a tracked landmark, `None` if it looks new
    pub fn associate(&self, observation: &Observation) -> SlamResult<Option<usize>> {
        self.check_dimensions()?;
        validate_observation(observation)?;

        let gate = self.config.association.gate;
        let index = match self.config.association.metric {
            AssociationMetric::Euclidean => {
                let candidate = self.sensor.inverse(&self.pose(), observation);
                associate_euclidean(&candidate, self.landmarks(), gate)
            }
            AssociationMetric::Mahalanobis => {
                let distances = (0..self.landmark_count()).map(|i| {
                    let inn = self.innovation(i, observation);
                    let d = match inn.s.try_inverse() {
                        Some(s_inv) => (inn.y.transpose() * s_inv * inn.y)[(0, 0)].sqrt(),
                        None => f64::NAN,
                    };
                    (i, d)
                });
                nearest_within_gate(distances, gate)
            }
        };

        trace!(
            range = observation.range,
            bearing = observation.bearing,
            ?index,
            "associate"
        );
        Ok(index)
    }

    /// Match a candidate already resolved into the global frame.
    ///
    /// Always Euclidean; the configured gate is used as a distance in meters.
    pub fn associate_position(&self, candidate: &Point2D) -> Option<usize> {
        associate_euclidean(candidate, self.landmarks(), self.config.association.gate)
    }

    /// Append a landmark initialized from `observation`; returns its index
    pub fn augment(&mut self, observation: &Observation) -> SlamResult<usize> {
        self.check_dimensions()?;
        validate_observation(observation)?;

        let pose = self.pose();
        let (g_pose, g_obs) = self.sensor.inverse_jacobian(&pose, observation);
        let init = LandmarkInit {
            position: self.sensor.inverse(&pose, observation),
            g_pose,
            g_obs,
        };

        let index = self.landmark_count();
        let r = self.config.measurement_noise.covariance();
        let (x, p) = augmented(&self.x, &self.p, &init, &r);
        self.x = x;
        self.p = p;

        debug!(
            index,
            x = init.position.x,
            y = init.position.y,
            "new landmark"
        );
        Ok(index)
    }

    /// Measurement update with one observation of landmark `index`.
    ///
    /// All-or-nothing: on error the state and covariance are untouched.
    pub fn correct(&mut self, observation: &Observation, index: usize) -> SlamResult<()> {
        self.check_dimensions()?;
        let landmark_count = self.landmark_count();
        if index >= landmark_count {
            return Err(SlamError::InvalidIndex {
                index,
                landmark_count,
            });
        }
        validate_observation(observation)?;

        let Innovation { y, h, s } = self.innovation(index, observation);
        let s_inv = invert_innovation(&s, index)?;
        let s_inv = DMatrix::from_fn(2, 2, |i, j| s_inv[(i, j)]);

        // Kalman gain K = P H^T S^-1
        let k = &self.p * h.transpose() * s_inv;

        let y_dvec = DVector::from_vec(vec![y[0], y[1]]);
        let mut new_x = &self.x + &k * y_dvec;
        new_x[2] = normalize_angle(new_x[2]);

        let mut new_p = match self.config.covariance_update {
            CovarianceUpdate::Standard => &self.p - &k * (&h * &self.p),
            CovarianceUpdate::Joseph => {
                let n = self.x.len();
                let r = self.config.measurement_noise.covariance();
                let r = DMatrix::from_fn(2, 2, |i, j| r[(i, j)]);
                let i_kh = DMatrix::identity(n, n) - &k * &h;
                &i_kh * &self.p * i_kh.transpose() + &k * r * k.transpose()
            }
        };
        symmetrize(&mut new_p);

        trace!(index, dr = y[0], dbearing = y[1], "correct");
        self.x = new_x;
        self.p = new_p;
        Ok(())
    }

    /// Associate, augment if unmatched, then correct.
    ///
    /// A landmark created for this observation is removed again if the
    /// correct step fails, so an error leaves the estimator unchanged.
    pub fn process_observation(
        &mut self,
        observation: &Observation,
    ) -> SlamResult<ObservationOutcome> {
        let n = self.x.len();
        let (index, is_new) = self.resolve_index(observation)?;
        if let Err(e) = self.correct(observation, index) {
            if is_new {
                self.truncate(n);
            }
            return Err(e);
        }
        Ok(ObservationOutcome { index, is_new })
    }

    /// One full cycle: predict, then process every observation.
    ///
    /// The control and every observation are validated before predict, so
    /// invalid input leaves the estimator unchanged. Observations whose
    /// innovation covariance is singular are skipped and listed in the
    /// report; a skipped observation with `is_new` still added its landmark,
    /// uncorrected.
    pub fn step(
        &mut self,
        control: &ControlInput,
        observations: &[Observation],
    ) -> SlamResult<StepReport> {
        self.check_dimensions()?;
        validate_control(control)?;
        for observation in observations {
            validate_observation(observation)?;
        }

        self.predict(control)?;

        let mut report = StepReport::default();
        for observation in observations {
            let (index, is_new) = self.resolve_index(observation)?;
            match self.correct(observation, index) {
                Ok(()) => report.corrected.push(ObservationOutcome { index, is_new }),
                Err(SlamError::SingularInnovationCovariance { determinant, .. }) => {
                    debug!(index, determinant, "skipping observation");
                    report.skipped.push(SkippedObservation {
                        observation: *observation,
                        index,
                        is_new,
                        determinant,
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(report)
    }

    /// Drop every state component past `n`; augment only ever appends
    fn truncate(&mut self, n: usize) {
        self.x = self.x.rows(0, n).into_owned();
        self.p = self.p.view((0, 0), (n, n)).into_owned();
    }

    fn resolve_index(&mut self, observation: &Observation) -> SlamResult<(usize, bool)> {
        match self.associate(observation)? {
            Some(index) => Ok((index, false)),
            None => Ok((self.augment(observation)?, true)),
        }
    }

    /// Caller guarantees `index < landmark_count()`
    fn innovation(&self, index: usize, observation: &Observation) -> Innovation {
        let pose = self.pose();
        let offset = lm_offset(index);
        let landmark = Point2D::new(self.x[offset], self.x[offset + 1]);

        let expected = self.sensor.observe(&pose, &landmark);
        let y = Vector2::new(
            observation.range - expected.range,
            angle_diff(expected.bearing, observation.bearing),
        );

        let (h_pose, h_lm) = self.sensor.jacobian(&pose, &landmark);
        let mut h = DMatrix::zeros(2, self.x.len());
        h.fixed_view_mut::<2, STATE_SIZE>(0, 0).copy_from(&h_pose);
        h.fixed_view_mut::<2, LM_SIZE>(0, offset).copy_from(&h_lm);

        let hph = &h * &self.p * h.transpose();
        let s = Matrix2::new(hph[(0, 0)], hph[(0, 1)], hph[(1, 0)], hph[(1, 1)])
            + self.config.measurement_noise.covariance();

        Innovation { y, h, s }
    }

    fn check_dimensions(&self) -> SlamResult<()> {
        let n = self.x.len();
        let (rows, cols) = self.p.shape();
        if n < STATE_SIZE || (n - STATE_SIZE) % LM_SIZE != 0 || rows != n || cols != n {
            return Err(SlamError::DimensionMismatch {
                state: n,
                rows,
                cols,
            });
        }
        Ok(())
    }
}

fn lm_offset(index: usize) -> usize {
    STATE_SIZE + index * LM_SIZE
}

fn validate_control(control: &ControlInput) -> SlamResult<()> {
    if control.is_finite() && control.dt >= 0.0 {
        Ok(())
    } else {
        Err(SlamError::InvalidInput(format!(
            "control must be finite with dt >= 0, got {:?}",
            control
        )))
    }
}

fn validate_observation(observation: &Observation) -> SlamResult<()> {
    if observation.is_valid() {
        Ok(())
    } else {
        Err(SlamError::InvalidInput(format!(
            "observation must have finite range >= 0 and finite bearing, got {:?}",
            observation
        )))
    }
}

fn invert_innovation(s: &Matrix2<f64>, index: usize) -> SlamResult<Matrix2<f64>> {
    let determinant = s.determinant();
    let scale = (s[(0, 0)] * s[(1, 1)]).abs();
    let singular = !s.iter().all(|v| v.is_finite())
        || !determinant.is_finite()
        || determinant.abs() <= SINGULARITY_EPS * scale;
    if singular {
        return Err(SlamError::SingularInnovationCovariance { index, determinant });
    }
    s.try_inverse()
        .ok_or(SlamError::SingularInnovationCovariance { index, determinant })
}
