//! End-to-end runs of the estimator with exact controls and observations

use approx::assert_relative_eq;
use nalgebra::SymmetricEigen;

use ekf_slam::settings::{Settings, DEFAULT_CONFIG_PATH};
use ekf_slam::simulation::{run_scenario, ScenarioConfig, SimConfig};
use ekf_slam::slam::{
    AssociationConfig, CovarianceUpdate, EkfSlam, EkfSlamConfig, MeasurementNoise, ProcessNoise,
    RangeBearingModel, VelocityMotionModel,
};
use ekf_slam::{ControlInput, MotionModel, ObservationModel, Point2D, Pose2D, SlamError};

fn exact_config(update: CovarianceUpdate) -> EkfSlamConfig {
    EkfSlamConfig {
        process_noise: ProcessNoise::Fixed {
            x: 0.0,
            y: 0.0,
            theta: 0.0,
        },
        measurement_noise: MeasurementNoise::new(0.01, 0.001),
        association: AssociationConfig::euclidean(0.5),
        initial_pose_variance: [0.0; 3],
        covariance_update: update,
    }
}

/// Drive straight past a landmark at (3, 0) for five 1 m steps
fn drive_past_landmark(update: CovarianceUpdate) {
    let motion = VelocityMotionModel::new();
    let sensor = RangeBearingModel::new();
    let landmark = Point2D::new(3.0, 0.0);
    let u = ControlInput::new(1.0, 0.0, 1.0);

    let mut truth = Pose2D::origin();
    let mut slam = EkfSlam::new(truth, exact_config(update)).unwrap();
    let mut last_variance: Option<(f64, f64)> = None;
    let mut skipped = 0;

    for step in 1..=5 {
        truth = motion.propagate(&truth, &u);
        let z = sensor.observe(&truth, &landmark);
        let report = slam.step(&u, &[z]).unwrap();
        skipped += report.skipped.len();

        if step == 3 {
            // the robot sits on the landmark: zero range, no usable Jacobian
            assert_eq!(report.skipped.len(), 1);
            assert_eq!(report.skipped[0].index, 0);
            assert!(!report.skipped[0].is_new);
        } else {
            assert_eq!(report.corrected.len(), 1);
            assert_eq!(report.corrected[0].index, 0);
            assert_eq!(report.corrected[0].is_new, step == 1);
        }

        let p = slam.landmark_covariance(0).unwrap();
        if let Some((vx, vy)) = last_variance {
            assert!(p[(0, 0)] <= vx * (1.0 + 1e-9), "step {}: x variance grew", step);
            assert!(p[(1, 1)] <= vy * (1.0 + 1e-9), "step {}: y variance grew", step);
        }
        last_variance = Some((p[(0, 0)], p[(1, 1)]));
    }

    assert_eq!(skipped, 1);
    assert_eq!(slam.landmark_count(), 1);

    let pose = slam.pose();
    assert_relative_eq!(pose.x, 5.0, epsilon = 1e-9);
    assert_relative_eq!(pose.y, 0.0, epsilon = 1e-9);
    assert_relative_eq!(pose.theta, 0.0, epsilon = 1e-9);

    let lm = slam.landmark(0).unwrap();
    assert_relative_eq!(lm.x, 3.0, epsilon = 1e-9);
    assert_relative_eq!(lm.y, 0.0, epsilon = 1e-9);

    let p = slam.covariance();
    assert_eq!(p.shape(), (5, 5));
    assert_relative_eq!(p.clone(), p.transpose(), epsilon = 1e-12);
}

#[test]
fn test_straight_drive_past_landmark() {
    drive_past_landmark(CovarianceUpdate::Standard);
}

#[test]
fn test_straight_drive_past_landmark_joseph() {
    drive_past_landmark(CovarianceUpdate::Joseph);
}

#[test]
fn test_association_picks_nearest_landmark() {
    let sensor = RangeBearingModel::new();
    let origin = Pose2D::origin();
    let mut slam = EkfSlam::new(origin, exact_config(CovarianceUpdate::Standard)).unwrap();

    assert_eq!(slam.augment(&sensor.observe(&origin, &Point2D::new(5.0, 5.0))).unwrap(), 0);
    assert_eq!(slam.augment(&sensor.observe(&origin, &Point2D::new(10.0, 10.0))).unwrap(), 1);

    let near = sensor.observe(&origin, &Point2D::new(5.1, 5.1));
    assert_eq!(slam.associate(&near).unwrap(), Some(0));
    assert_eq!(slam.associate_position(&Point2D::new(5.1, 5.1)), Some(0));

    let far = sensor.observe(&origin, &Point2D::new(20.0, 20.0));
    assert_eq!(slam.associate(&far).unwrap(), None);
}

#[test]
fn test_invalid_index_leaves_state_untouched() {
    let sensor = RangeBearingModel::new();
    let origin = Pose2D::origin();
    let mut slam = EkfSlam::new(origin, exact_config(CovarianceUpdate::Standard)).unwrap();
    let z = sensor.observe(&origin, &Point2D::new(2.0, 1.0));
    slam.augment(&z).unwrap();

    let x_before = slam.state().clone();
    let p_before = slam.covariance().clone();

    let err = slam.correct(&z, 1).unwrap_err();
    assert!(matches!(
        err,
        SlamError::InvalidIndex {
            index: 1,
            landmark_count: 1
        }
    ));
    assert_eq!(slam.state(), &x_before);
    assert_eq!(slam.covariance(), &p_before);
}

#[test]
fn test_closed_loop_noiseless_scenario() {
    let scenario = ScenarioConfig {
        steps: 5,
        initial_pose: [0.0, 0.0, 0.0],
        controls: vec![[1.0, 0.0, 1.0]],
        landmarks: vec![[3.0, 0.0]],
        plot_path: None,
    };
    let outcome = run_scenario(
        &scenario,
        &exact_config(CovarianceUpdate::Standard),
        &SimConfig::noiseless(),
    )
    .unwrap();

    assert_eq!(outcome.history.len(), 6);
    assert_eq!(outcome.skipped, 1);
    let (pos_err, heading_err) = outcome.history.final_estimate_error().unwrap();
    assert!(pos_err < 1e-9);
    assert!(heading_err < 1e-9);
    let errors = outcome.landmark_errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0] < 1e-9);
}

#[test]
fn test_default_settings_run() {
    let settings = Settings::load(DEFAULT_CONFIG_PATH).unwrap();
    let outcome = run_scenario(&settings.scenario, &settings.filter, &settings.simulation).unwrap();

    assert_eq!(outcome.history.len(), settings.scenario.steps + 1);
    assert!(outcome.slam.landmark_count() >= outcome.map.len());
    assert!(outcome.slam.pose().is_finite());

    // the default loop keeps landmarks in view, so SLAM must beat dead reckoning
    let (estimate_err, _) = outcome.history.final_estimate_error().unwrap();
    let (dead_reckoning_err, _) = outcome.history.final_dead_reckoning_error().unwrap();
    assert!(
        estimate_err < dead_reckoning_err,
        "estimate {} m vs dead reckoning {} m",
        estimate_err,
        dead_reckoning_err
    );
    let p = outcome.slam.covariance();
    assert_relative_eq!(p.clone(), p.transpose(), epsilon = 1e-9);
    let min_eigenvalue = SymmetricEigen::new(p.clone()).eigenvalues.min();
    assert!(min_eigenvalue >= -1e-9, "min eigenvalue {}", min_eigenvalue);
}
