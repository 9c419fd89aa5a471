// SLAM algorithms module

pub mod augmentation;
pub mod config;
pub mod data_association;
pub mod ekf_slam;
pub mod motion_model;
pub mod observation_model;

// Re-exports
pub use config::{
    AssociationConfig, AssociationMetric, CovarianceUpdate, EkfSlamConfig, MeasurementNoise,
    ProcessNoise,
};
pub use ekf_slam::{EkfSlam, ObservationOutcome, SkippedObservation, StepReport};
pub use motion_model::VelocityMotionModel;
pub use observation_model::RangeBearingModel;
