//! Closed-loop run of the estimator against the simulated robot

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::common::{ControlInput, MotionModel, Pose2D, SlamError, SlamResult};
use crate::slam::{EkfSlam, EkfSlamConfig, VelocityMotionModel};

use super::history::SlamHistory;
use super::robot::{SimConfig, SimulatedRobot};
use super::world::LandmarkMap;

/// What to drive and where
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScenarioConfig {
    pub steps: usize,
    pub initial_pose: [f64; 3],
    /// `[v, omega, dt]` commands, applied cyclically
    pub controls: Vec<[f64; 3]>,
    /// True landmark positions
    pub landmarks: Vec<[f64; 2]>,
    /// Write an SVG of the run here (demo binary only)
    #[serde(default)]
    pub plot_path: Option<String>,
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub slam: EkfSlam,
    pub history: SlamHistory,
    pub map: LandmarkMap,
    /// Observations dropped because of a singular innovation covariance
    pub skipped: usize,
}

impl ScenarioOutcome {
    /// Distance from each estimated landmark to the closest true landmark
    pub fn landmark_errors(&self) -> Vec<f64> {
        self.slam
            .landmarks()
            .iter()
            .filter_map(|lm| self.map.nearest_distance(lm))
            .collect()
    }
}

/// Drive the simulated robot through `scenario`, estimating as it goes.
///
/// Each step the robot moves with a noisy version of the command, senses the
/// visible landmarks, and the estimator runs predict with the commanded
/// control followed by associate / augment / correct per observation.
pub fn run_scenario(
    scenario: &ScenarioConfig,
    filter: &EkfSlamConfig,
    sim: &SimConfig,
) -> SlamResult<ScenarioOutcome> {
    if scenario.controls.is_empty() {
        return Err(SlamError::InvalidParameter(
            "scenario.controls must contain at least one command".to_string(),
        ));
    }

    let initial = Pose2D::from(scenario.initial_pose);
    let map = LandmarkMap::from(scenario.landmarks.clone());
    let mut robot = SimulatedRobot::new(initial, sim.clone())?;
    let mut slam = EkfSlam::new(initial, filter.clone())?;
    let motion = VelocityMotionModel::new();

    let mut history = SlamHistory::new(initial);
    let mut dead_reckoning = initial;
    let mut skipped = 0;

    info!(
        steps = scenario.steps,
        landmarks = map.len(),
        "starting scenario"
    );

    for (step, command) in scenario
        .controls
        .iter()
        .cycle()
        .take(scenario.steps)
        .enumerate()
    {
        let u = ControlInput::from(*command);
        robot.step(&u);
        dead_reckoning = motion.propagate(&dead_reckoning, &u);

        let observations = robot.observe(&map);
        let report = slam.step(&u, &observations)?;
        for s in report.skipped.iter() {
            warn!(
                step,
                index = s.index,
                range = s.observation.range,
                "singular innovation covariance, observation skipped"
            );
        }
        skipped += report.skipped.len();

        let estimate = slam.pose();
        debug!(
            step,
            observed = observations.len(),
            new_landmarks = report.new_landmarks(),
            landmarks = slam.landmark_count(),
            x = estimate.x,
            y = estimate.y,
            theta = estimate.theta,
            "step"
        );
        history.record(robot.pose(), dead_reckoning, estimate);
    }

    info!(
        landmarks = slam.landmark_count(),
        skipped,
        "scenario finished"
    );

    Ok(ScenarioOutcome {
        slam,
        history,
        map,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slam::{AssociationConfig, CovarianceUpdate, MeasurementNoise, ProcessNoise};

    fn filter() -> EkfSlamConfig {
        EkfSlamConfig {
            process_noise: ProcessNoise::Proportional {
                linear_scale: 0.1,
                linear_floor: 0.01,
                angular_scale: 0.2,
                angular_floor: 0.01,
            },
            measurement_noise: MeasurementNoise::new(0.01, 0.001),
            association: AssociationConfig::euclidean(1.0),
            initial_pose_variance: [0.0; 3],
            covariance_update: CovarianceUpdate::Standard,
        }
    }

    #[test]
    fn test_rejects_empty_controls() {
        let scenario = ScenarioConfig {
            steps: 3,
            initial_pose: [0.0; 3],
            controls: vec![],
            landmarks: vec![],
            plot_path: None,
        };
        assert!(matches!(
            run_scenario(&scenario, &filter(), &SimConfig::noiseless()),
            Err(SlamError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_history_length_and_landmarks() {
        let scenario = ScenarioConfig {
            steps: 20,
            initial_pose: [0.0; 3],
            controls: vec![[1.0, 0.2, 0.5], [1.0, 0.0, 0.5]],
            landmarks: vec![[4.0, 2.0], [2.0, -3.0], [-3.0, 4.0]],
            plot_path: None,
        };
        let outcome = run_scenario(&scenario, &filter(), &SimConfig::noiseless()).unwrap();
        assert_eq!(outcome.history.len(), 21);
        assert_eq!(outcome.slam.landmark_count(), 3);
        for err in outcome.landmark_errors() {
            assert!(err < 1e-6, "landmark error {}", err);
        }
        let (pos, heading) = outcome.history.final_estimate_error().unwrap();
        assert!(pos < 1e-6);
        assert!(heading < 1e-6);
    }
}
