//! Run settings loaded from TOML
//!
//! ```toml
//! [filter]
//! initial_pose_variance = [0.0, 0.0, 0.0]
//!
//! [filter.process_noise]
//! model = "proportional"
//! linear_scale = 0.1
//! # ...
//! ```
//!
//! See `config/default.toml` for a complete file.

use config::{Config, File, FileFormat};
use serde::Deserialize;
use tracing::{error, info};

use crate::common::SlamResult;
use crate::simulation::{ScenarioConfig, SimConfig};
use crate::slam::EkfSlamConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Everything needed for one simulated run
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub filter: EkfSlamConfig,
    pub simulation: SimConfig,
    pub scenario: ScenarioConfig,
}

impl Settings {
    /// Load and validate settings from a TOML file
    pub fn load(path: &str) -> SlamResult<Self> {
        info!("Loading settings from {}", path);
        let built = Config::builder()
            .add_source(File::new(path, FileFormat::Toml).required(true))
            .build();
        match built {
            Ok(cfg) => Self::from_config(cfg),
            Err(e) => {
                error!("Failed to load settings from {}: {}", path, e);
                Err(e.into())
            }
        }
    }

    /// Parse and validate settings from TOML text
    pub fn from_toml_str(text: &str) -> SlamResult<Self> {
        let cfg = Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?;
        Self::from_config(cfg)
    }

    fn from_config(cfg: Config) -> SlamResult<Self> {
        let settings: Settings = cfg.try_deserialize()?;
        settings.filter.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::SlamError;
    use crate::slam::{AssociationMetric, CovarianceUpdate, ProcessNoise};

    const SAMPLE: &str = r#"
[filter]
initial_pose_variance = [0.0, 0.0, 0.0]

[filter.process_noise]
model = "proportional"
linear_scale = 0.1
linear_floor = 0.01
angular_scale = 0.2
angular_floor = 0.01

[filter.measurement_noise]
range_variance = 0.01
bearing_variance = 0.001

[filter.association]
gate = 0.5

[simulation]
use_noise = true
control_bias = [0.1, -0.2]
control_jitter = 0.03
sensor_max_range = 5.0
range_noise_std = 0.0
bearing_noise_std = 0.0
seed = 7

[scenario]
steps = 10
initial_pose = [0.0, 0.0, 0.0]
controls = [[1.0, 0.1, 1.0]]
landmarks = [[3.0, 0.0], [5.0, 5.0]]
"#;

    #[test]
    fn test_parse_sample() {
        let settings = Settings::from_toml_str(SAMPLE).unwrap();
        assert_eq!(settings.filter.association.metric, AssociationMetric::Euclidean);
        assert_eq!(settings.filter.covariance_update, CovarianceUpdate::Standard);
        assert!(matches!(
            settings.filter.process_noise,
            ProcessNoise::Proportional { .. }
        ));
        assert_eq!(settings.simulation.seed, 7);
        assert!((settings.simulation.sensor_half_fov - 0.75 * std::f64::consts::PI).abs() < 1e-12);
        assert_eq!(settings.scenario.landmarks.len(), 2);
        assert!(settings.scenario.plot_path.is_none());
    }

    #[test]
    fn test_fixed_process_noise() {
        let text = SAMPLE.replace(
            "model = \"proportional\"\nlinear_scale = 0.1\nlinear_floor = 0.01\nangular_scale = 0.2\nangular_floor = 0.01",
            "model = \"fixed\"\nx = 0.01\ny = 0.01\ntheta = 0.001",
        );
        let settings = Settings::from_toml_str(&text).unwrap();
        assert!(matches!(
            settings.filter.process_noise,
            ProcessNoise::Fixed { .. }
        ));
    }

    #[test]
    fn test_missing_measurement_noise_is_error() {
        let text = SAMPLE.replace(
            "[filter.measurement_noise]\nrange_variance = 0.01\nbearing_variance = 0.001\n",
            "",
        );
        assert!(matches!(
            Settings::from_toml_str(&text),
            Err(SlamError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_gate_is_rejected() {
        let text = SAMPLE.replace("gate = 0.5", "gate = -1.0");
        assert!(matches!(
            Settings::from_toml_str(&text),
            Err(SlamError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(Settings::load("does/not/exist.toml").is_err());
    }
}
